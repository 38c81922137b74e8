use reflex_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid level {0}: expected 1..=6")]
    InvalidLevel(u8),

    #[error("math option {0} does not exist")]
    InvalidOption(usize),

    #[error("no level has been started")]
    NotStarted,
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidLevel(id) => EngineError::InvalidLevel(id),
        }
    }
}
