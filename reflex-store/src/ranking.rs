use reflex_core::Level;
use serde::Serialize;
use tracing::warn;

use crate::identity::Identity;
use crate::record::{RankingQuery, ScoreRecord};
use crate::store::ScoreStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based position on the board.
    pub rank: usize,
    pub nickname: String,
    pub score: u64,
    pub avg_reaction_ms: u64,
    pub is_me: bool,
}

impl RankingRow {
    fn from_record(rank: usize, record: &ScoreRecord, me: Option<&Identity>) -> Self {
        let s = &record.submission;
        Self {
            rank,
            nickname: s.nickname.clone(),
            score: s.score,
            avg_reaction_ms: s.avg_reaction_ms.round().max(0.0) as u64,
            is_me: me.is_some_and(|id| *id == s.identity),
        }
    }

    /// Gold, silver or bronze place.
    pub fn podium(&self) -> Option<u8> {
        match self.rank {
            1..=3 => Some(self.rank as u8),
            _ => None,
        }
    }
}

/// What the ranking screen shows. A failed read is reported as such rather
/// than as stale or partial rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum RankingView {
    #[default]
    Loading,
    Loaded {
        level: Level,
        rows: Vec<RankingRow>,
    },
    Failed {
        level: Level,
        reason: String,
    },
}

impl RankingView {
    pub fn level(&self) -> Option<Level> {
        match self {
            RankingView::Loading => None,
            RankingView::Loaded { level, .. } | RankingView::Failed { level, .. } => Some(*level),
        }
    }
}

pub fn load_ranking(
    store: &dyn ScoreStore,
    query: &RankingQuery,
    me: Option<&Identity>,
) -> RankingView {
    match store.query(query) {
        Ok(records) => RankingView::Loaded {
            level: query.level,
            rows: records
                .iter()
                .enumerate()
                .map(|(i, r)| RankingRow::from_record(i + 1, r, me))
                .collect(),
        },
        Err(e) => {
            warn!(level = query.level.get(), error = %e, "failed to load ranking");
            RankingView::Failed {
                level: query.level,
                reason: e.to_string(),
            }
        }
    }
}
