use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::debug;

use crate::error::StoreError;
use crate::record::{RankingQuery, ScoreRecord, ScoreSubmission, rank};

/// Append-only score storage with a leaderboard query.
pub trait ScoreStore: Send + Sync {
    /// Stores one submission, stamping it with the store's clock.
    fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError>;

    /// Records matching `query`, highest score first, at most `query.limit`.
    fn query(&self, query: &RankingQuery) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// One JSON record per line in a local file.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                    path: self.path.clone(),
                    line: i + 1,
                    source,
                })
            })
            .collect()
    }
}

impl ScoreStore for JsonlStore {
    fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
        let record = ScoreRecord {
            submission,
            server_timestamp: Utc::now(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("writer lock poisoned".into()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!(path = %self.path.display(), score = record.submission.score, "score appended");
        Ok(record)
    }

    fn query(&self, query: &RankingQuery) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(rank(self.read_all()?, query))
    }
}

/// In-process store. Can be switched offline to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ScoreRecord>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ScoreStore for MemoryStore {
    fn append(&self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
        self.check_online()?;
        let record = ScoreRecord {
            submission,
            server_timestamp: Utc::now(),
        };
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".into()))?
            .push(record.clone());
        Ok(record)
    }

    fn query(&self, query: &RankingQuery) -> Result<Vec<ScoreRecord>, StoreError> {
        self.check_online()?;
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("record lock poisoned".into()))?;
        Ok(rank(records.iter().cloned(), query))
    }
}
