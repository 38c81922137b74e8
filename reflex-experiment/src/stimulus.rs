//! Per-level stimulus distributions. Each generator is a pure function of one
//! uniform draw, so a fixed draw always yields the same stimulus.

use reflex_core::{Color, Level, Stimulus, StimulusKind};

use crate::level::LevelConfig;

const GREEN_GO: Stimulus = Stimulus::new(StimulusKind::Go, Some(Color::Green), false);
const SOUND_GO: Stimulus = Stimulus::new(StimulusKind::Go, None, true);
const RED_NO_GO: Stimulus = Stimulus::new(StimulusKind::NoGo, Some(Color::Red), false);
const GREEN_SOUND_GO: Stimulus = Stimulus::new(StimulusKind::Go, Some(Color::Green), true);
const RED_SOUND_LEFT: Stimulus = Stimulus::new(StimulusKind::Left, Some(Color::Red), true);
const BLUE_RIGHT: Stimulus = Stimulus::new(StimulusKind::Right, Some(Color::Blue), false);

pub type StimulusGenerator = fn(f64) -> Stimulus;

pub(crate) fn light_only(_r: f64) -> Stimulus {
    GREEN_GO
}

pub(crate) fn sound_only(_r: f64) -> Stimulus {
    SOUND_GO
}

pub(crate) fn light_or_sound(r: f64) -> Stimulus {
    if r > 0.5 { GREEN_GO } else { SOUND_GO }
}

pub(crate) fn inhibition(r: f64) -> Stimulus {
    if r > 0.7 { RED_NO_GO } else { GREEN_GO }
}

pub(crate) fn directional(r: f64) -> Stimulus {
    if r < 0.4 {
        GREEN_SOUND_GO
    } else if r < 0.7 {
        RED_SOUND_LEFT
    } else {
        BLUE_RIGHT
    }
}

/// Stimulus for `level` given a uniform draw `r` in `[0, 1)`.
pub fn generate_stimulus(level: Level, r: f64) -> Stimulus {
    (LevelConfig::for_level(level).stimulus_generator)(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: u8) -> Level {
        Level::new(id).unwrap()
    }

    #[test]
    fn fixed_levels_ignore_draw() {
        for r in [0.0, 0.3, 0.99] {
            assert_eq!(generate_stimulus(level(1), r), GREEN_GO);
            assert_eq!(generate_stimulus(level(2), r), SOUND_GO);
            assert_eq!(generate_stimulus(level(5), r), GREEN_GO);
        }
        assert!(generate_stimulus(level(2), 0.5).is_audio_only());
    }

    #[test]
    fn level_three_splits_at_half() {
        assert_eq!(generate_stimulus(level(3), 0.51), GREEN_GO);
        assert_eq!(generate_stimulus(level(3), 0.5), SOUND_GO);
        assert_eq!(generate_stimulus(level(3), 0.1), SOUND_GO);
    }

    #[test]
    fn level_four_is_thirty_percent_no_go() {
        assert_eq!(generate_stimulus(level(4), 0.69), GREEN_GO);
        assert_eq!(generate_stimulus(level(4), 0.7), GREEN_GO);
        assert_eq!(generate_stimulus(level(4), 0.71), RED_NO_GO);

        let no_go = (0..1_000)
            .map(|i| generate_stimulus(level(4), f64::from(i) / 1_000.0))
            .filter(|s| s.kind == StimulusKind::NoGo)
            .count();
        assert_eq!(no_go, 299);
    }

    #[test]
    fn level_six_bands() {
        assert_eq!(generate_stimulus(level(6), 0.0), GREEN_SOUND_GO);
        assert_eq!(generate_stimulus(level(6), 0.39), GREEN_SOUND_GO);
        assert_eq!(generate_stimulus(level(6), 0.4), RED_SOUND_LEFT);
        assert_eq!(generate_stimulus(level(6), 0.69), RED_SOUND_LEFT);
        assert_eq!(generate_stimulus(level(6), 0.7), BLUE_RIGHT);
        assert!(!generate_stimulus(level(6), 0.9).emits_sound);
    }

    #[test]
    fn same_draw_same_stimulus() {
        for lv in Level::ALL {
            for i in 0..50 {
                let r = f64::from(i) / 50.0;
                assert_eq!(generate_stimulus(lv, r), generate_stimulus(lv, r));
            }
        }
    }
}
