use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::math::MathProblem;
use crate::score::ScoreResult;
use crate::stimulus::Stimulus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Setup,
    Game,
    Result,
    Ranking,
}

/// Instructions the trial engine hands to its collaborators, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    ShowScreen(Screen),
    LevelIndicator(Level),
    SwipeHints(bool),
    /// Countdown digit to display.
    Countdown(u8),
    ClearStimulus,
    PresentStimulus(Stimulus),
    PlayTone,
    FalseStartFlash,
    ShowMath(MathProblem),
    HideMath,
    Finished { level: Level, result: ScoreResult },
}
