use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

const NICKNAME_FILE: &str = "nickname";

/// Per-user files under the data directory.
#[derive(Debug, Clone)]
pub struct Profile {
    data_dir: PathBuf,
    nickname: String,
}

impl Profile {
    /// Opens `data_dir`, creating it if needed. A nickname given here
    /// replaces the saved one.
    pub fn load(data_dir: impl Into<PathBuf>, nickname: Option<&str>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("cannot create data dir {}", data_dir.display()))?;

        let path = data_dir.join(NICKNAME_FILE);
        let nickname = match nickname {
            Some(name) => {
                let name = name.trim().to_string();
                fs::write(&path, &name)
                    .with_context(|| format!("cannot save nickname to {}", path.display()))?;
                debug!(nickname = %name, "nickname saved");
                name
            }
            None => match fs::read_to_string(&path) {
                Ok(saved) => saved.trim().to_string(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
                Err(e) => {
                    return Err(e).with_context(|| format!("cannot read {}", path.display()));
                }
            },
        };
        Ok(Self { data_dir, nickname })
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn scores_path(&self) -> PathBuf {
        self.data_dir.join("scores.jsonl")
    }

    pub fn identity_path(&self) -> PathBuf {
        self.data_dir.join("device_id")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("last_session.json")
    }
}
