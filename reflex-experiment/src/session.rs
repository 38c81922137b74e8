use reflex_core::{GameState, Level, MathProblem, ScoreResult, Stimulus, Trial};
use serde::Serialize;

/// A reaction that is waiting on its arithmetic answer.
#[derive(Debug, Clone)]
pub(crate) struct PendingMath {
    pub(crate) trial: Trial,
    pub(crate) problem: MathProblem,
}

/// One run of a level. Replaced wholesale when a level (re)starts.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    level: Level,
    trial_count: usize,
    trials: Vec<Trial>,
    state: GameState,
    current_stimulus: Option<Stimulus>,
    stimulus_started_ms: Option<f64>,
    #[serde(skip)]
    pending: Option<PendingMath>,
    result: Option<ScoreResult>,
}

impl Session {
    pub(crate) fn new(level: Level, trial_count: usize) -> Self {
        Self {
            level,
            trial_count,
            trials: Vec::with_capacity(trial_count),
            state: GameState::Idle,
            current_stimulus: None,
            stimulus_started_ms: None,
            pending: None,
            result: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        self.current_stimulus.as_ref()
    }

    pub fn stimulus_started_ms(&self) -> Option<f64> {
        self.stimulus_started_ms
    }

    pub fn math_problem(&self) -> Option<&MathProblem> {
        self.pending.as_ref().map(|p| &p.problem)
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    /// `(next trial number, total)`, 1-based, for progress display.
    pub fn progress(&self) -> (usize, usize) {
        ((self.trials.len() + 1).min(self.trial_count), self.trial_count)
    }

    pub fn is_complete(&self) -> bool {
        self.trials.len() >= self.trial_count
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub(crate) fn present(&mut self, stimulus: Stimulus, now_ms: f64) {
        self.current_stimulus = Some(stimulus);
        self.stimulus_started_ms = Some(now_ms);
    }

    pub(crate) fn take_stimulus(&mut self) -> Option<(Stimulus, f64)> {
        let stimulus = self.current_stimulus.take()?;
        let started = self.stimulus_started_ms.take()?;
        Some((stimulus, started))
    }

    pub(crate) fn discard_stimulus(&mut self) {
        self.current_stimulus = None;
        self.stimulus_started_ms = None;
    }

    pub(crate) fn set_pending(&mut self, pending: PendingMath) {
        self.pending = Some(pending);
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingMath> {
        self.pending.take()
    }

    /// Appends a finished trial. The history never outgrows the level.
    pub(crate) fn record(&mut self, trial: Trial) {
        debug_assert!(self.trials.len() < self.trial_count);
        if self.trials.len() < self.trial_count {
            self.trials.push(trial);
        }
    }

    pub(crate) fn finish(&mut self, result: ScoreResult) {
        self.state = GameState::Finished;
        self.result = Some(result);
    }
}
