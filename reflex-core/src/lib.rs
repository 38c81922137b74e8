pub mod command;
pub mod error;
pub mod input;
pub mod level;
pub mod math;
pub mod phase;
pub mod score;
pub mod stimulus;
pub mod trial;

pub use command::{EngineCommand, Screen};
pub use error::CoreError;
pub use input::{DEFAULT_SWIPE_THRESHOLD_PX, InputAction, classify_swipe};
pub use level::Level;
pub use math::{MathOp, MathProblem};
pub use phase::GameState;
pub use score::ScoreResult;
pub use stimulus::{Color, Stimulus, StimulusKind};
pub use trial::{Outcome, Trial};
