pub mod scheduler;
pub mod timer;

pub use scheduler::{Scheduler, TimerHandle};
pub use timer::{Clock, MonotonicClock};
