use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathOp {
    Add,
    Multiply,
}

impl MathOp {
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            MathOp::Add => lhs + rhs,
            MathOp::Multiply => lhs * rhs,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            MathOp::Add => '+',
            MathOp::Multiply => '×',
        }
    }
}

/// A secondary arithmetic task shown after the reaction on dual-task levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub lhs: i64,
    pub rhs: i64,
    pub op: MathOp,
    pub options: [i64; 4],
}

impl MathProblem {
    pub fn answer(&self) -> i64 {
        self.op.apply(self.lhs, self.rhs)
    }

    /// `None` when `index` does not name one of the four options.
    pub fn check(&self, index: usize) -> Option<bool> {
        self.options.get(index).map(|&v| v == self.answer())
    }

    pub fn question(&self) -> String {
        format!("{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}
