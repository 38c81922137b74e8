use reflex_core::{
    EngineCommand, GameState, InputAction, Screen, StimulusKind, Trial, classify_swipe,
};
use reflex_timing::Scheduler;
use tracing::{debug, info, trace};

use super::config::EngineConfig;
use super::error::EngineError;
use super::level::LevelConfig;
use super::math::generate_problem;
use super::random::RandomSource;
use super::score::compute_score;
use super::session::{PendingMath, Session};

/// Continuations the engine parks on its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    CountdownTick { remaining: u8 },
    PresentStimulus,
    ResumeAfterFalseStart,
}

/// Judges one reaction against the stimulus it answered.
///
/// No-go stimuli are never credited: any action on them is a miss.
pub fn classify_response(kind: StimulusKind, action: InputAction, reaction_ms: f64) -> Trial {
    match (kind, action) {
        (StimulusKind::Go, InputAction::Tap)
        | (StimulusKind::Left, InputAction::Left)
        | (StimulusKind::Right, InputAction::Right) => Trial::correct(kind, reaction_ms),
        _ => Trial::miss(kind),
    }
}

/// Drives one level run at a time.
///
/// Every entry point takes the caller's monotonic timestamp and returns the
/// commands for the renderer, in order. Waits are parked on an internal
/// scheduler that the host drains through [`TrialEngine::poll`]; starting a
/// level or a false start cancels the whole timer group.
pub struct TrialEngine<R: RandomSource> {
    config: EngineConfig,
    rng: R,
    timers: Scheduler<Wakeup>,
    level_config: Option<&'static LevelConfig>,
    session: Option<Session>,
    pointer_origin: Option<f32>,
}

impl<R: RandomSource> TrialEngine<R> {
    pub fn new(config: EngineConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            timers: Scheduler::new(),
            level_config: None,
            session: None,
            pointer_origin: None,
        }
    }

    pub fn start_level(
        &mut self,
        level_id: u8,
        now_ms: f64,
    ) -> Result<Vec<EngineCommand>, EngineError> {
        let cfg = LevelConfig::resolve(level_id)?;

        let dropped = self.timers.cancel_all();
        self.pointer_origin = None;
        self.level_config = Some(cfg);
        let mut session = Session::new(cfg.level, cfg.trial_count);
        session.set_state(GameState::Countdown);
        self.session = Some(session);

        info!(level = level_id, trials = cfg.trial_count, dropped, "level started");

        let steps = self.config.countdown_steps;
        let mut cmds = vec![
            EngineCommand::ShowScreen(Screen::Game),
            EngineCommand::LevelIndicator(cfg.level),
            EngineCommand::SwipeHints(cfg.directional),
            EngineCommand::HideMath,
            EngineCommand::ClearStimulus,
        ];
        if steps == 0 {
            self.next_trial(now_ms, &mut cmds);
        } else {
            cmds.push(EngineCommand::Countdown(steps));
            self.timers.schedule(
                now_ms,
                self.config.countdown_tick_ms,
                Wakeup::CountdownTick {
                    remaining: steps - 1,
                },
            );
        }
        Ok(cmds)
    }

    /// Restarts the level of the current session from scratch.
    pub fn retry(&mut self, now_ms: f64) -> Result<Vec<EngineCommand>, EngineError> {
        let level = self.session.as_ref().ok_or(EngineError::NotStarted)?.level();
        self.start_level(level.get(), now_ms)
    }

    /// Fires every continuation that is due at `now_ms`.
    pub fn poll(&mut self, now_ms: f64) -> Vec<EngineCommand> {
        let mut cmds = Vec::new();
        for wakeup in self.timers.poll(now_ms) {
            trace!(?wakeup, now_ms, "wakeup");
            match wakeup {
                Wakeup::CountdownTick { remaining } => {
                    self.countdown_tick(remaining, now_ms, &mut cmds);
                }
                Wakeup::PresentStimulus => self.present_stimulus(now_ms, &mut cmds),
                Wakeup::ResumeAfterFalseStart => {
                    if self.state() == GameState::Penalty {
                        self.next_trial(now_ms, &mut cmds);
                    }
                }
            }
        }
        cmds
    }

    /// Handles a discrete response. On levels without directional stimuli
    /// every action counts as a tap.
    pub fn on_action(&mut self, action: InputAction, now_ms: f64) -> Vec<EngineCommand> {
        let action = match self.level_config {
            Some(cfg) if !cfg.directional => InputAction::Tap,
            _ => action,
        };
        let mut cmds = Vec::new();
        match self.state() {
            GameState::Waiting => self.false_start(now_ms, &mut cmds),
            GameState::Reacting => self.react(action, now_ms, &mut cmds),
            state => trace!(?state, ?action, "input ignored"),
        }
        cmds
    }

    /// Press of a pointer at horizontal position `x`.
    ///
    /// Without directional stimuli the press is the response, so nothing
    /// waits for the release.
    pub fn on_pointer_down(&mut self, x: f32, now_ms: f64) -> Vec<EngineCommand> {
        if !self.state().accepts_input() {
            return Vec::new();
        }
        if self.is_directional() {
            self.pointer_origin = Some(x);
            Vec::new()
        } else {
            self.on_action(InputAction::Tap, now_ms)
        }
    }

    /// Release of a pointer; on directional levels classifies the swipe.
    pub fn on_pointer_up(&mut self, x: f32, now_ms: f64) -> Vec<EngineCommand> {
        if !self.is_directional() {
            return Vec::new();
        }
        let Some(origin) = self.pointer_origin.take() else {
            return Vec::new();
        };
        if !self.state().accepts_input() {
            return Vec::new();
        }
        let action = classify_swipe(x - origin, self.config.swipe_threshold_px);
        self.on_action(action, now_ms)
    }

    /// Picks one of the four arithmetic options by position.
    pub fn answer_math(
        &mut self,
        option: usize,
        now_ms: f64,
    ) -> Result<Vec<EngineCommand>, EngineError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };
        if session.state() != GameState::Math {
            return Ok(Vec::new());
        }
        let correct = session
            .math_problem()
            .and_then(|p| p.check(option))
            .ok_or(EngineError::InvalidOption(option))?;
        let Some(pending) = session.take_pending() else {
            return Ok(Vec::new());
        };

        debug!(option, correct, "math answered");
        session.record(pending.trial.with_math(correct));
        let mut cmds = vec![EngineCommand::HideMath];
        self.next_trial(now_ms, &mut cmds);
        Ok(cmds)
    }

    pub fn state(&self) -> GameState {
        self.session
            .as_ref()
            .map_or(GameState::Idle, Session::state)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn level_config(&self) -> Option<&'static LevelConfig> {
        self.level_config
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// When the host should call [`TrialEngine::poll`] next.
    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Abandons the current run, cancelling its timers.
    pub fn abort(&mut self) -> Option<Session> {
        self.timers.cancel_all();
        self.pointer_origin = None;
        self.level_config = None;
        self.session.take()
    }

    fn is_directional(&self) -> bool {
        self.level_config.is_some_and(|cfg| cfg.directional)
    }

    fn countdown_tick(&mut self, remaining: u8, now_ms: f64, cmds: &mut Vec<EngineCommand>) {
        if self.state() != GameState::Countdown {
            return;
        }
        if remaining > 0 {
            cmds.push(EngineCommand::Countdown(remaining));
            self.timers.schedule(
                now_ms,
                self.config.countdown_tick_ms,
                Wakeup::CountdownTick {
                    remaining: remaining - 1,
                },
            );
        } else {
            cmds.push(EngineCommand::ClearStimulus);
            self.next_trial(now_ms, cmds);
        }
    }

    fn next_trial(&mut self, now_ms: f64, cmds: &mut Vec<EngineCommand>) {
        let (Some(cfg), Some(session)) = (self.level_config, self.session.as_mut()) else {
            return;
        };
        if session.is_complete() {
            self.finish(cmds);
            return;
        }

        session.set_state(GameState::Waiting);
        session.discard_stimulus();
        cmds.push(EngineCommand::ClearStimulus);

        let delay = self.rng.next_range(cfg.min_delay_ms, cfg.max_delay_ms);
        self.timers.schedule(now_ms, delay, Wakeup::PresentStimulus);
        debug!(
            trial = session.trials().len() + 1,
            delay_ms = delay,
            "waiting for stimulus"
        );
    }

    fn present_stimulus(&mut self, now_ms: f64, cmds: &mut Vec<EngineCommand>) {
        let (Some(cfg), Some(session)) = (self.level_config, self.session.as_mut()) else {
            return;
        };
        if session.state() != GameState::Waiting {
            return;
        }
        let stimulus = (cfg.stimulus_generator)(self.rng.next_unit());
        session.present(stimulus, now_ms);
        session.set_state(GameState::Reacting);

        debug!(?stimulus, at_ms = now_ms, "stimulus presented");
        cmds.push(EngineCommand::PresentStimulus(stimulus));
        if stimulus.emits_sound {
            cmds.push(EngineCommand::PlayTone);
        }
    }

    fn false_start(&mut self, now_ms: f64, cmds: &mut Vec<EngineCommand>) {
        let cancelled = self.timers.cancel_all();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.discard_stimulus();
        session.record(Trial::false_start());
        session.set_state(GameState::Penalty);

        info!(trial = session.trials().len(), cancelled, "false start");
        cmds.push(EngineCommand::FalseStartFlash);
        self.timers.schedule(
            now_ms,
            self.config.false_start_penalty_ms,
            Wakeup::ResumeAfterFalseStart,
        );
    }

    fn react(&mut self, action: InputAction, now_ms: f64, cmds: &mut Vec<EngineCommand>) {
        let (Some(cfg), Some(session)) = (self.level_config, self.session.as_mut()) else {
            return;
        };
        let Some((stimulus, started_ms)) = session.take_stimulus() else {
            return;
        };
        let trial = classify_response(stimulus.kind, action, now_ms - started_ms);
        info!(
            trial = session.trials().len() + 1,
            kind = ?stimulus.kind,
            ?action,
            correct = trial.is_correct(),
            reaction_ms = trial.reaction_ms(),
            "response"
        );

        match cfg.math {
            Some(op) => {
                let problem = generate_problem(op, &mut self.rng);
                cmds.push(EngineCommand::ShowMath(problem.clone()));
                session.set_pending(PendingMath { trial, problem });
                session.set_state(GameState::Math);
            }
            None => {
                session.record(trial);
                self.next_trial(now_ms, cmds);
            }
        }
    }

    fn finish(&mut self, cmds: &mut Vec<EngineCommand>) {
        let (Some(cfg), Some(session)) = (self.level_config, self.session.as_mut()) else {
            return;
        };
        self.timers.cancel_all();
        let result = compute_score(cfg, session.trials());
        session.finish(result);

        info!(
            level = cfg.level.get(),
            score = result.score,
            avg_ms = result.avg_reaction_ms,
            accuracy = result.accuracy,
            misses = result.miss_count,
            "level finished"
        );
        cmds.push(EngineCommand::ShowScreen(Screen::Result));
        cmds.push(EngineCommand::Finished {
            level: cfg.level,
            result,
        });
    }
}
