use reflex_core::{Level, MathOp};

use crate::error::EngineError;
use crate::stimulus::{self, StimulusGenerator};

/// Score bonus for steady reaction times: `points` when the population
/// standard deviation of valid reaction times is below `max_sd_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyBonus {
    pub max_sd_ms: f64,
    pub points: u64,
}

pub const CONSISTENCY_BONUS: ConsistencyBonus = ConsistencyBonus {
    max_sd_ms: 50.0,
    points: 1_000,
};

#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub level: Level,
    pub trial_count: usize,
    pub stimulus_generator: StimulusGenerator,
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
    pub score_multiplier: f64,
    pub miss_penalty: u64,
    /// Secondary arithmetic task after each reaction.
    pub math: Option<MathOp>,
    /// Whether responses are discriminated by swipe direction.
    pub directional: bool,
    pub consistency_bonus: Option<ConsistencyBonus>,
}

const STANDARD_DELAY_MS: (f64, f64) = (1_000.0, 3_000.0);
const FAST_DELAY_MS: (f64, f64) = (800.0, 1_500.0);

static LEVELS: [LevelConfig; 6] = [
    LevelConfig {
        level: Level::ALL[0],
        trial_count: 5,
        stimulus_generator: stimulus::light_only,
        min_delay_ms: STANDARD_DELAY_MS.0,
        max_delay_ms: STANDARD_DELAY_MS.1,
        score_multiplier: 1.0,
        miss_penalty: 500,
        math: None,
        directional: false,
        consistency_bonus: None,
    },
    LevelConfig {
        level: Level::ALL[1],
        trial_count: 5,
        stimulus_generator: stimulus::sound_only,
        min_delay_ms: STANDARD_DELAY_MS.0,
        max_delay_ms: STANDARD_DELAY_MS.1,
        score_multiplier: 1.2,
        miss_penalty: 500,
        math: None,
        directional: false,
        consistency_bonus: None,
    },
    LevelConfig {
        level: Level::ALL[2],
        trial_count: 7,
        stimulus_generator: stimulus::light_or_sound,
        min_delay_ms: STANDARD_DELAY_MS.0,
        max_delay_ms: STANDARD_DELAY_MS.1,
        score_multiplier: 1.4,
        miss_penalty: 500,
        math: None,
        directional: false,
        consistency_bonus: None,
    },
    LevelConfig {
        level: Level::ALL[3],
        trial_count: 8,
        stimulus_generator: stimulus::inhibition,
        min_delay_ms: STANDARD_DELAY_MS.0,
        max_delay_ms: STANDARD_DELAY_MS.1,
        score_multiplier: 1.6,
        miss_penalty: 500,
        math: None,
        directional: false,
        consistency_bonus: None,
    },
    LevelConfig {
        level: Level::ALL[4],
        trial_count: 10,
        stimulus_generator: stimulus::light_only,
        min_delay_ms: FAST_DELAY_MS.0,
        max_delay_ms: FAST_DELAY_MS.1,
        score_multiplier: 1.8,
        miss_penalty: 500,
        math: Some(MathOp::Add),
        directional: false,
        consistency_bonus: Some(CONSISTENCY_BONUS),
    },
    LevelConfig {
        level: Level::ALL[5],
        trial_count: 10,
        stimulus_generator: stimulus::directional,
        min_delay_ms: STANDARD_DELAY_MS.0,
        max_delay_ms: STANDARD_DELAY_MS.1,
        score_multiplier: 2.0,
        miss_penalty: 1_000,
        math: Some(MathOp::Multiply),
        directional: true,
        consistency_bonus: None,
    },
];

impl LevelConfig {
    /// Looks up a level by its raw identifier. Unknown identifiers are an error.
    pub fn resolve(id: u8) -> Result<&'static LevelConfig, EngineError> {
        let level = Level::new(id)?;
        Ok(Self::for_level(level))
    }

    pub fn for_level(level: Level) -> &'static LevelConfig {
        &LEVELS[level.index()]
    }

    pub fn all() -> &'static [LevelConfig] {
        &LEVELS
    }
}
