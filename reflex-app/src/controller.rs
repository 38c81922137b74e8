use std::fs;
use std::io::Write;
use std::thread::JoinHandle;

use reflex_core::{EngineCommand, Level, Screen};
use reflex_experiment::{EngineError, RandomSource, TrialEngine};
use reflex_render::{Layout, SaveStatus, SceneState};
use reflex_store::{RankingQuery, ScoreReporter, SubmitOutcome};
use tracing::{debug, info, warn};

use crate::input::UiAction;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Glue between the trial engine, the scene the renderer draws and the
/// score store. Knows nothing about windows; the shell feeds it actions,
/// pointer positions and timestamps.
pub struct Controller<R: RandomSource> {
    engine: TrialEngine<R>,
    scene: SceneState,
    reporter: ScoreReporter,
    profile: Profile,
    layout: Layout,
    last_level: Option<Level>,
    pending_save: Option<JoinHandle<SubmitOutcome>>,
}

fn join_save(handle: JoinHandle<SubmitOutcome>) -> SubmitOutcome {
    handle
        .join()
        .unwrap_or_else(|_| SubmitOutcome::Failed("score writer panicked".into()))
}

fn ring_bell() {
    let mut err = std::io::stderr();
    let _ = err.write_all(b"\x07").and_then(|()| err.flush());
}

impl<R: RandomSource> Controller<R> {
    pub fn new(engine: TrialEngine<R>, reporter: ScoreReporter, profile: Profile) -> Self {
        Self {
            engine,
            scene: SceneState::new(profile.nickname()),
            reporter,
            profile,
            layout: Layout::new(1, 1),
            last_level: None,
            pending_save: None,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.layout = Layout::new(width, height);
    }

    /// When the engine next needs [`Controller::tick`].
    pub fn next_due(&self) -> Option<f64> {
        self.engine.next_due()
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn handle(&mut self, action: UiAction, now_ms: f64) -> Flow {
        match action {
            UiAction::StartLevel(level) => self.start(level, now_ms),
            UiAction::Respond(input) => {
                let cmds = self.engine.on_action(input, now_ms);
                self.apply(&cmds);
            }
            UiAction::MathOption(option) => self.answer(option, now_ms),
            UiAction::Retry => match self.engine.retry(now_ms) {
                Ok(cmds) => self.apply(&cmds),
                Err(e) => warn!(error = %e, "retry ignored"),
            },
            UiAction::ShowRanking(level) => self.show_ranking(level),
            UiAction::Title => {
                if self.engine.abort().is_some() {
                    debug!("run abandoned");
                }
                self.scene.show(Screen::Setup);
            }
            UiAction::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// Pointer press in canvas pixels.
    pub fn pointer_down(&mut self, x: f32, y: f32, now_ms: f64) {
        match self.scene.screen {
            Screen::Setup => {
                if let Some(level) = self.layout.hit_level(x, y) {
                    self.start(level, now_ms);
                }
            }
            Screen::Game if self.scene.math.is_some() => {
                if let Some(option) = self.layout.hit_math_option(x, y) {
                    self.answer(option, now_ms);
                }
            }
            Screen::Game => {
                let cmds = self.engine.on_pointer_down(x, now_ms);
                self.apply(&cmds);
            }
            Screen::Result | Screen::Ranking => {}
        }
    }

    pub fn pointer_up(&mut self, x: f32, _y: f32, now_ms: f64) {
        if self.scene.screen == Screen::Game && self.scene.math.is_none() {
            let cmds = self.engine.on_pointer_up(x, now_ms);
            self.apply(&cmds);
        }
    }

    /// Fires due timers and picks up a finished score write. Returns whether
    /// the scene changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let cmds = self.engine.poll(now_ms);
        self.apply(&cmds);
        let saved = self.collect_save(false);
        !cmds.is_empty() || saved
    }

    /// Blocks until the background score write is done.
    pub fn finish_pending_save(&mut self) {
        self.collect_save(true);
    }

    fn start(&mut self, level: Level, now_ms: f64) {
        match self.engine.start_level(level.get(), now_ms) {
            Ok(cmds) => self.apply(&cmds),
            Err(EngineError::InvalidLevel(id)) => warn!(level = id, "no such level"),
            Err(e) => warn!(error = %e, "level not started"),
        }
    }

    fn answer(&mut self, option: usize, now_ms: f64) {
        match self.engine.answer_math(option, now_ms) {
            Ok(cmds) => self.apply(&cmds),
            Err(e) => warn!(error = %e, "answer ignored"),
        }
    }

    fn show_ranking(&mut self, level: Option<Level>) {
        let level = level.or(self.last_level).unwrap_or(Level::ALL[0]);
        self.scene.show(Screen::Ranking);
        self.scene.ranking = self
            .reporter
            .load_ranking(level, RankingQuery::DEFAULT_LIMIT);
    }

    fn apply(&mut self, cmds: &[EngineCommand]) {
        for cmd in cmds {
            self.scene.apply(cmd);
            match cmd {
                EngineCommand::PlayTone => ring_bell(),
                EngineCommand::Finished { level, result } => {
                    self.last_level = Some(*level);
                    self.export_session();
                    if let Some(earlier) = self.pending_save.take() {
                        let status = SaveStatus::from(&join_save(earlier));
                        info!(?status, "earlier score write finished");
                    }
                    let nickname = self.profile.nickname().to_string();
                    self.pending_save =
                        Some(self.reporter.submit_in_background(nickname, *level, *result));
                }
                _ => {}
            }
        }
        self.scene.progress = self.engine.session().map(|s| s.progress());
    }

    fn export_session(&self) {
        let Some(session) = self.engine.session() else {
            return;
        };
        let path = self.profile.session_path();
        let written = session
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => debug!(path = %path.display(), "session exported"),
            Err(error) => warn!(path = %path.display(), %error, "session export failed"),
        }
    }

    fn collect_save(&mut self, block: bool) -> bool {
        let ready = self
            .pending_save
            .as_ref()
            .is_some_and(|h| block || h.is_finished());
        if !ready {
            return false;
        }
        let Some(handle) = self.pending_save.take() else {
            return false;
        };
        let status = SaveStatus::from(&join_save(handle));
        info!(?status, "score write finished");
        self.scene.save_status = status;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{InputAction, ScoreResult};
    use reflex_experiment::{EngineConfig, ScriptedSource};
    use reflex_store::{Identity, IdentityProvider, MemoryStore, NoIdentity, RankingView};
    use std::sync::Arc;

    struct Rig {
        controller: Controller<ScriptedSource>,
        store: Arc<MemoryStore>,
        _dir: tempfile::TempDir,
    }

    fn rig(identity: Arc<dyn IdentityProvider>) -> Rig {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::load(dir.path(), Some("kai")).unwrap();
        let store = Arc::new(MemoryStore::new());
        let reporter = ScoreReporter::new(store.clone(), identity);
        let engine = TrialEngine::new(EngineConfig::default(), ScriptedSource::constant(0.0));
        let mut controller = Controller::new(engine, reporter, profile);
        controller.resize(1280, 720);
        Rig {
            controller,
            store,
            _dir: dir,
        }
    }

    fn level(n: u8) -> Level {
        Level::new(n).unwrap()
    }

    /// Plays level 1 to the end, answering every stimulus after 250 ms.
    fn play_level_one(c: &mut Controller<ScriptedSource>) {
        c.handle(UiAction::StartLevel(level(1)), 0.0);
        while c.scene().screen == Screen::Game {
            let due = c.next_due().expect("engine should be waiting");
            c.tick(due);
            if c.scene().stimulus.is_some() {
                c.handle(UiAction::Respond(InputAction::Tap), due + 250.0);
            }
        }
    }

    #[test]
    fn full_run_saves_and_exports() {
        let mut r = rig(Arc::new(Identity::new("device-1")));
        play_level_one(&mut r.controller);

        let scene = r.controller.scene();
        assert_eq!(scene.screen, Screen::Result);
        let (lv, result) = scene.result.unwrap();
        assert_eq!(lv, level(1));
        assert_eq!(result.score, 40_000);
        assert_eq!(scene.progress, Some((5, 5)));

        r.controller.finish_pending_save();
        assert_eq!(r.controller.scene().save_status, SaveStatus::Saved);
        assert!(!r.controller.is_saving());
        assert_eq!(r.store.len(), 1);

        let exported = fs::read_to_string(r.controller.profile.session_path()).unwrap();
        assert!(exported.contains("\"trials\""));
    }

    #[test]
    fn second_finish_settles_the_earlier_write() {
        let mut r = rig(Arc::new(Identity::new("device-4")));
        let finished = EngineCommand::Finished {
            level: level(1),
            result: ScoreResult {
                score: 1_000,
                ..ScoreResult::default()
            },
        };
        r.controller.apply(std::slice::from_ref(&finished));
        r.controller.apply(std::slice::from_ref(&finished));
        assert!(r.store.len() >= 1);
        assert!(r.controller.is_saving());

        r.controller.finish_pending_save();
        assert_eq!(r.store.len(), 2);
        assert_eq!(r.controller.scene().save_status, SaveStatus::Saved);
    }

    #[test]
    fn anonymous_run_is_not_saved() {
        let mut r = rig(Arc::new(NoIdentity));
        play_level_one(&mut r.controller);
        r.controller.finish_pending_save();
        assert_eq!(r.controller.scene().save_status, SaveStatus::Skipped);
        assert!(r.store.is_empty());
    }

    #[test]
    fn ranking_defaults_to_last_level() {
        let mut r = rig(Arc::new(Identity::new("device-2")));
        r.controller.handle(UiAction::ShowRanking(None), 0.0);
        assert_eq!(r.controller.scene().ranking.level(), Some(level(1)));

        play_level_one(&mut r.controller);
        r.controller.finish_pending_save();
        r.controller.handle(UiAction::ShowRanking(None), 0.0);
        let RankingView::Loaded { rows, .. } = &r.controller.scene().ranking else {
            panic!("ranking should load");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_me);
        assert_eq!(rows[0].nickname, "kai");
    }

    #[test]
    fn offline_store_shows_failure() {
        let mut r = rig(Arc::new(Identity::new("device-3")));
        r.store.set_offline(true);
        play_level_one(&mut r.controller);
        r.controller.finish_pending_save();
        assert_eq!(r.controller.scene().save_status, SaveStatus::Failed);

        r.controller.handle(UiAction::ShowRanking(Some(level(1))), 0.0);
        assert!(matches!(
            r.controller.scene().ranking,
            RankingView::Failed { .. }
        ));
    }

    #[test]
    fn clicking_a_tile_starts_its_level() {
        let mut r = rig(Arc::new(NoIdentity));
        let tile = Layout::new(1280, 720).level_tiles()[2];
        let (x, y) = tile.center();
        r.controller.pointer_down(x, y, 0.0);
        assert_eq!(r.controller.scene().screen, Screen::Game);
        assert_eq!(r.controller.scene().level, Some(level(3)));
        assert_eq!(r.controller.scene().countdown, Some(3));
    }

    #[test]
    fn title_abandons_the_run() {
        let mut r = rig(Arc::new(NoIdentity));
        r.controller.handle(UiAction::StartLevel(level(2)), 0.0);
        assert!(r.controller.next_due().is_some());
        r.controller.handle(UiAction::Title, 10.0);
        assert_eq!(r.controller.scene().screen, Screen::Setup);
        assert_eq!(r.controller.next_due(), None);
        assert!(r.controller.engine.session().is_none());
    }

    #[test]
    fn quit_exits() {
        let mut r = rig(Arc::new(NoIdentity));
        assert_eq!(r.controller.handle(UiAction::Quit, 0.0), Flow::Exit);
    }
}
