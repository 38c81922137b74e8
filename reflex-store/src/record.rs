use chrono::{DateTime, Utc};
use reflex_core::{Level, ScoreResult};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Game mode every record of this game is filed under.
pub const MODE: &str = "simple_reaction";

pub const ANONYMOUS: &str = "Anonymous";

/// A score about to be written; the store adds the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub identity: Identity,
    pub nickname: String,
    pub mode: String,
    pub level: Level,
    pub score: u64,
    pub avg_reaction_ms: f64,
    pub correct_count: usize,
    pub miss_count: usize,
    pub trial_count: usize,
}

impl ScoreSubmission {
    pub fn new(identity: Identity, nickname: &str, level: Level, result: &ScoreResult) -> Self {
        let nickname = nickname.trim();
        Self {
            identity,
            nickname: if nickname.is_empty() {
                ANONYMOUS.to_string()
            } else {
                nickname.to_string()
            },
            mode: MODE.to_string(),
            level,
            score: result.score,
            avg_reaction_ms: result.avg_reaction_ms,
            correct_count: result.correct_count,
            miss_count: result.miss_count,
            trial_count: result.trial_count,
        }
    }
}

/// A stored score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(flatten)]
    pub submission: ScoreSubmission,
    pub server_timestamp: DateTime<Utc>,
}

/// Filter for the leaderboard: one mode and level, best scores first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingQuery {
    pub mode: String,
    pub level: Level,
    pub limit: usize,
}

impl RankingQuery {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn top(level: Level) -> Self {
        Self {
            mode: MODE.to_string(),
            level,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(self, limit: usize) -> Self {
        Self { limit, ..self }
    }

    pub fn matches(&self, record: &ScoreRecord) -> bool {
        record.submission.mode == self.mode && record.submission.level == self.level
    }
}

/// Applies a ranking query to an unordered set of records.
pub(crate) fn rank(
    records: impl IntoIterator<Item = ScoreRecord>,
    query: &RankingQuery,
) -> Vec<ScoreRecord> {
    let mut hits: Vec<_> = records.into_iter().filter(|r| query.matches(r)).collect();
    // Stable sort: equal scores keep insertion order.
    hits.sort_by(|a, b| b.submission.score.cmp(&a.submission.score));
    hits.truncate(query.limit);
    hits
}
