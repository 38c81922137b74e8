use reflex_core::{MathOp, MathProblem};

use crate::random::RandomSource;

/// Two operands in `1..=9`, the correct answer plus three near misses,
/// in random order.
pub fn generate_problem<R: RandomSource>(op: MathOp, rng: &mut R) -> MathProblem {
    let lhs = rng.next_int(1, 9);
    let rhs = rng.next_int(1, 9);
    let answer = op.apply(lhs, rhs);
    let mut options = [answer, answer + 1, answer - 1, answer + 2];
    rng.shuffle(&mut options);
    MathProblem {
        lhs,
        rhs,
        op,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedSource};

    #[test]
    fn addition_from_fixed_draws() {
        // 0.2 -> 2, 0.5 -> 5; the remaining draws drive the shuffle.
        let mut rng = ScriptedSource::new([0.2, 0.5, 0.99, 0.99, 0.99]);
        let p = generate_problem(MathOp::Add, &mut rng);
        assert_eq!((p.lhs, p.rhs), (2, 5));
        assert_eq!(p.answer(), 7);
        assert_eq!(p.options, [7, 8, 6, 9]);
    }

    #[test]
    fn options_always_contain_answer_once() {
        let mut rng = RngSource::seeded(3);
        for op in [MathOp::Add, MathOp::Multiply] {
            for _ in 0..200 {
                let p = generate_problem(op, &mut rng);
                assert!((1..=9).contains(&p.lhs) && (1..=9).contains(&p.rhs));
                let a = p.answer();
                let mut sorted = p.options;
                sorted.sort();
                assert_eq!(sorted, [a - 1, a, a + 1, a + 2]);
                assert_eq!((0..4).filter(|&i| p.check(i) == Some(true)).count(), 1);
            }
        }
    }
}
