use reflex_core::{EngineCommand, Level, MathProblem, Screen, ScoreResult, Stimulus};
use reflex_store::{RankingView, SubmitOutcome};

/// Progress of the background score write, as shown on the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Skipped,
    Failed,
}

impl From<&SubmitOutcome> for SaveStatus {
    fn from(outcome: &SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Saved(_) => SaveStatus::Saved,
            SubmitOutcome::SkippedNoIdentity => SaveStatus::Skipped,
            SubmitOutcome::Failed(_) => SaveStatus::Failed,
        }
    }
}

/// Everything the renderer needs for one frame. Built by folding engine
/// commands in order; the host adds what the engine does not own.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    pub screen: Screen,
    pub level: Option<Level>,
    pub swipe_hints: bool,
    pub countdown: Option<u8>,
    pub stimulus: Option<Stimulus>,
    pub false_start: bool,
    pub math: Option<MathProblem>,
    /// Current trial number and total, for the progress readout.
    pub progress: Option<(usize, usize)>,
    pub result: Option<(Level, ScoreResult)>,
    pub save_status: SaveStatus,
    pub ranking: RankingView,
    pub nickname: String,
    /// Tones requested so far; the host turns each into a sound.
    pub tones: u64,
}

impl SceneState {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, cmd: &EngineCommand) {
        match cmd {
            EngineCommand::ShowScreen(screen) => self.show(*screen),
            EngineCommand::LevelIndicator(level) => self.level = Some(*level),
            EngineCommand::SwipeHints(on) => self.swipe_hints = *on,
            EngineCommand::Countdown(n) => {
                self.countdown = Some(*n);
                self.stimulus = None;
            }
            EngineCommand::ClearStimulus => {
                self.countdown = None;
                self.stimulus = None;
                self.false_start = false;
            }
            EngineCommand::PresentStimulus(stimulus) => {
                self.countdown = None;
                self.false_start = false;
                self.stimulus = Some(*stimulus);
            }
            EngineCommand::PlayTone => self.tones += 1,
            EngineCommand::FalseStartFlash => {
                self.stimulus = None;
                self.false_start = true;
            }
            EngineCommand::ShowMath(problem) => self.math = Some(problem.clone()),
            EngineCommand::HideMath => self.math = None,
            EngineCommand::Finished { level, result } => {
                self.result = Some((*level, *result));
                self.save_status = SaveStatus::Saving;
            }
        }
    }

    pub fn apply_all<'a>(&mut self, cmds: impl IntoIterator<Item = &'a EngineCommand>) {
        for cmd in cmds {
            self.apply(cmd);
        }
    }

    /// Switches screens, dropping game-screen transients.
    pub fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.countdown = None;
        self.stimulus = None;
        self.false_start = false;
        self.math = None;
        match screen {
            Screen::Game => {
                self.result = None;
                self.save_status = SaveStatus::Idle;
            }
            Screen::Ranking => self.ranking = RankingView::Loading,
            Screen::Setup | Screen::Result => {}
        }
    }
}
