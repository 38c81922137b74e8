pub mod config;
pub mod error;
pub mod level;
pub mod math;
pub mod random;
pub mod score;
pub mod session;
pub mod state;
pub mod stimulus;

pub use config::EngineConfig;
pub use error::EngineError;
pub use level::{CONSISTENCY_BONUS, ConsistencyBonus, LevelConfig};
pub use math::generate_problem;
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use score::compute_score;
pub use session::Session;
pub use state::{TrialEngine, Wakeup, classify_response};
pub use stimulus::{StimulusGenerator, generate_stimulus};
