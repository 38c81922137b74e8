use serde::{Deserialize, Serialize};

/// Final figures for one completed session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u64,
    pub avg_reaction_ms: f64,
    /// Fraction of trials counted correct, in `[0, 1]`.
    pub accuracy: f64,
    pub correct_count: usize,
    pub miss_count: usize,
    pub trial_count: usize,
    pub penalty: u64,
    pub bonus: u64,
}

impl ScoreResult {
    pub fn accuracy_percent(&self) -> u32 {
        (self.accuracy * 100.0).round() as u32
    }
}
