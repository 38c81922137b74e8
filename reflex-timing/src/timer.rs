use std::time::Instant;

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> f64;

    fn elapsed_ms(&self, since_ms: f64) -> f64 {
        (self.now_ms() - since_ms).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct MonotonicClock {
    pub start: Instant,
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1_000.0
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
