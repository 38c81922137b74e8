use reflex_core::DEFAULT_SWIPE_THRESHOLD_PX;

/// Level-independent pacing of a run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub countdown_steps: u8,
    pub countdown_tick_ms: f64,
    pub false_start_penalty_ms: f64,
    pub swipe_threshold_px: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            countdown_steps: 3,
            countdown_tick_ms: 1_000.0,
            false_start_penalty_ms: 500.0,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
        }
    }
}
