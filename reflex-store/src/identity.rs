use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;

/// Opaque, stable per-device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Supplies the identity scores are written under. `None` means scores are
/// not persisted at all.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<Identity>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentityProvider for NoIdentity {
    fn identity(&self) -> Option<Identity> {
        None
    }
}

impl IdentityProvider for Identity {
    fn identity(&self) -> Option<Identity> {
        Some(self.clone())
    }
}

/// Identity kept in a small file, minted on first use.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    path: PathBuf,
    id: Identity,
}

impl DeviceIdentity {
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        match fs::read_to_string(&path) {
            Ok(raw) if !raw.trim().is_empty() => {
                let id = Identity::new(raw.trim());
                Ok(Self { path, id })
            }
            Ok(_) => Self::create(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::create(path),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn create(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let id = Identity::new(Uuid::new_v4().to_string());
        fs::write(&path, id.as_str()).map_err(|e| StoreError::io(&path, e))?;
        info!(path = %path.display(), "provisioned device identity");
        Ok(Self { path, id })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityProvider for DeviceIdentity {
    fn identity(&self) -> Option<Identity> {
        Some(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_once_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("device_id");

        let first = DeviceIdentity::load_or_create(&path).unwrap();
        let id = first.identity().unwrap();
        assert!(Uuid::parse_str(id.as_str()).is_ok());

        let second = DeviceIdentity::load_or_create(&path).unwrap();
        assert_eq!(second.identity(), Some(id));
    }

    #[test]
    fn blank_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device_id");
        fs::write(&path, "\n").unwrap();
        let device = DeviceIdentity::load_or_create(&path).unwrap();
        assert!(!device.identity().unwrap().as_str().is_empty());
    }

    #[test]
    fn no_identity_is_none() {
        assert_eq!(NoIdentity.identity(), None);
    }
}
