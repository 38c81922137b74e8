use reflex_core::{ScoreResult, Trial};

use crate::level::LevelConfig;

const SPEED_BASE_MS: f64 = 10_000.0;
const SCORE_SCALE: f64 = 1_000.0;

/// Scores a finished session.
///
/// Only correct trials contribute reaction times. A trial counts correct when
/// the reaction was right and its arithmetic, if any, was right too; a wrong
/// answer turns it into a miss.
pub fn compute_score(config: &LevelConfig, trials: &[Trial]) -> ScoreResult {
    let valid: Vec<f64> = trials.iter().filter_map(Trial::reaction_ms).collect();
    let avg_reaction_ms = mean(&valid);

    let correct_count = trials
        .iter()
        .filter(|t| t.is_correct() && t.math_correct() != Some(false))
        .count();
    let miss_count = trials
        .iter()
        .filter(|t| t.is_miss() || t.math_correct() == Some(false))
        .count();
    let accuracy = if trials.is_empty() {
        0.0
    } else {
        correct_count as f64 / trials.len() as f64
    };

    let penalty = miss_count as u64 * config.miss_penalty;
    let bonus = match config.consistency_bonus {
        Some(b) if valid.len() > 1 && std_dev(&valid, avg_reaction_ms) < b.max_sd_ms => b.points,
        _ => 0,
    };

    let score = if avg_reaction_ms > 0.0 {
        let speed = SPEED_BASE_MS / avg_reaction_ms;
        let raw = speed * accuracy * config.score_multiplier * SCORE_SCALE - penalty as f64
            + bonus as f64;
        raw.floor().max(0.0) as u64
    } else {
        0
    };

    ScoreResult {
        score,
        avg_reaction_ms,
        accuracy,
        correct_count,
        miss_count,
        trial_count: trials.len(),
        penalty,
        bonus,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation.
fn std_dev(values: &[f64], mean: f64) -> f64 {
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::StimulusKind;

    fn cfg(id: u8) -> &'static LevelConfig {
        LevelConfig::resolve(id).unwrap()
    }

    fn hits(times: &[f64]) -> Vec<Trial> {
        times
            .iter()
            .map(|&t| Trial::correct(StimulusKind::Go, t))
            .collect()
    }

    #[test]
    fn perfect_level_one() {
        let trials = hits(&[200.0, 210.0, 190.0, 205.0, 195.0]);
        let r = compute_score(cfg(1), &trials);
        assert_eq!(r.avg_reaction_ms, 200.0);
        assert_eq!(r.accuracy, 1.0);
        assert_eq!(r.penalty, 0);
        assert_eq!(r.bonus, 0);
        assert_eq!(r.score, 50_000);
        assert_eq!((r.correct_count, r.miss_count, r.trial_count), (5, 0, 5));
    }

    #[test]
    fn no_go_tap_costs_penalty() {
        let mut trials = hits(&[250.0; 7]);
        trials.insert(3, Trial::miss(StimulusKind::NoGo));
        let r = compute_score(cfg(4), &trials);
        assert_eq!(r.miss_count, 1);
        assert_eq!(r.penalty, 500);
        assert!(r.accuracy < 1.0);
        assert_eq!(r.accuracy, 7.0 / 8.0);
        assert_eq!(r.score, 55_500);
    }

    #[test]
    fn level_six_penalty_doubles() {
        let mut trials = hits(&[400.0; 9]);
        trials.push(Trial::miss(StimulusKind::Left));
        let r = compute_score(cfg(6), &trials);
        assert_eq!(r.penalty, 1_000);
    }

    #[test]
    fn steady_level_five_earns_bonus() {
        let times = [300.0, 301.0, 302.0, 303.0, 304.0, 305.0, 301.0, 302.0, 303.0, 304.0];
        let trials: Vec<_> = hits(&times).into_iter().map(|t| t.with_math(true)).collect();
        let r = compute_score(cfg(5), &trials);
        assert_eq!(r.bonus, 1_000);

        let base = ((SPEED_BASE_MS / r.avg_reaction_ms) * 1.8 * SCORE_SCALE).floor() as u64;
        assert!(r.score >= base + 999 && r.score <= base + 1_000);
    }

    #[test]
    fn erratic_level_five_has_no_bonus() {
        let trials = hits(&[200.0, 400.0, 200.0, 400.0]);
        assert_eq!(compute_score(cfg(5), &trials).bonus, 0);
    }

    #[test]
    fn single_valid_trial_has_no_bonus() {
        let mut trials = hits(&[300.0]);
        trials.push(Trial::false_start());
        assert_eq!(compute_score(cfg(5), &trials).bonus, 0);
    }

    #[test]
    fn wrong_math_counts_as_miss() {
        let trials = vec![
            Trial::correct(StimulusKind::Go, 300.0).with_math(true),
            Trial::correct(StimulusKind::Go, 300.0).with_math(false),
        ];
        let r = compute_score(cfg(5), &trials);
        assert_eq!(r.correct_count, 1);
        assert_eq!(r.miss_count, 1);
        assert_eq!(r.accuracy, 0.5);
        // Both reactions still count toward the average.
        assert_eq!(r.avg_reaction_ms, 300.0);
    }

    #[test]
    fn all_misses_scores_zero() {
        let trials = vec![Trial::false_start(), Trial::miss(StimulusKind::NoGo)];
        let r = compute_score(cfg(4), &trials);
        assert_eq!(r.avg_reaction_ms, 0.0);
        assert_eq!(r.score, 0);
    }

    #[test]
    fn heavy_penalty_clamps_at_zero() {
        let mut trials = hits(&[2_000.0]);
        trials.extend((0..9).map(|_| Trial::miss(StimulusKind::Right)));
        let r = compute_score(cfg(6), &trials);
        assert_eq!(r.score, 0);
    }

    #[test]
    fn faster_and_more_accurate_never_scores_lower() {
        let slow = compute_score(cfg(3), &hits(&[300.0; 7]));
        let fast = compute_score(cfg(3), &hits(&[250.0; 7]));
        assert!(fast.score >= slow.score);

        let mut sloppy = hits(&[250.0; 6]);
        sloppy.push(Trial::miss(StimulusKind::Go));
        let sloppy = compute_score(cfg(3), &sloppy);
        assert!(fast.score >= sloppy.score);
    }
}
