use std::sync::Arc;
use std::thread::{self, JoinHandle};

use reflex_core::{Level, ScoreResult};
use tracing::{debug, error, info};

use crate::identity::{Identity, IdentityProvider};
use crate::ranking::{RankingView, load_ranking};
use crate::record::{RankingQuery, ScoreRecord, ScoreSubmission};
use crate::store::ScoreStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(ScoreRecord),
    /// No identity was available, so nothing was written.
    SkippedNoIdentity,
    /// The write failed. It has been logged and will not be retried.
    Failed(String),
}

/// Writes finished sessions to a store under the device identity.
#[derive(Clone)]
pub struct ScoreReporter {
    store: Arc<dyn ScoreStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ScoreReporter {
    pub fn new(store: Arc<dyn ScoreStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.identity()
    }

    pub fn submit(&self, nickname: &str, level: Level, result: &ScoreResult) -> SubmitOutcome {
        let Some(identity) = self.identity.identity() else {
            debug!("no identity, score not persisted");
            return SubmitOutcome::SkippedNoIdentity;
        };
        let submission = ScoreSubmission::new(identity, nickname, level, result);
        match self.store.append(submission) {
            Ok(record) => {
                info!(level = level.get(), score = result.score, "score saved");
                SubmitOutcome::Saved(record)
            }
            Err(e) => {
                error!(level = level.get(), error = %e, "failed to save score");
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }

    /// Same as [`ScoreReporter::submit`] on a worker thread. Callers may
    /// drop the handle; the outcome is logged either way.
    pub fn submit_in_background(
        &self,
        nickname: String,
        level: Level,
        result: ScoreResult,
    ) -> JoinHandle<SubmitOutcome> {
        let reporter = self.clone();
        thread::spawn(move || reporter.submit(&nickname, level, &result))
    }

    pub fn load_ranking(&self, level: Level, limit: usize) -> RankingView {
        let me = self.identity.identity();
        let query = RankingQuery::top(level).with_limit(limit);
        load_ranking(self.store.as_ref(), &query, me.as_ref())
    }
}
