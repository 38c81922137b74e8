use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Level identifiers are 1 through 6.
    #[error("invalid level {0}: expected 1..=6")]
    InvalidLevel(u8),
}
