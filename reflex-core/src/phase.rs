use serde::{Deserialize, Serialize};

/// Trial engine states.
///
/// `Idle -> Countdown -> Waiting -> Reacting -> (Math) -> Waiting | Finished`.
/// `Penalty` is the flash that follows a false start before the next trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameState {
    #[default]
    Idle,
    Countdown,
    Waiting,
    Penalty,
    Reacting,
    Math,
    Finished,
}

impl GameState {
    /// States in which an input event has any effect.
    pub fn accepts_input(&self) -> bool {
        matches!(self, GameState::Waiting | GameState::Reacting)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GameState::Finished)
    }
}
