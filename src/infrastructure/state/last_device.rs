//! File-backed last connected device marker

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use crate::application::ports::{LastDeviceStore, StoreError};
use crate::domain::device::MacAddress;

/// Stores the MAC of the last connected device in a one-line text file
pub struct FileLastDeviceStore {
    path: PathBuf,
}

impl FileLastDeviceStore {
    /// Store under the XDG state directory
    pub fn new() -> Self {
        Self {
            path: Self::resolve_path(dirs::state_dir().or_else(dirs::data_local_dir)),
        }
    }

    /// Marker path below `base`; without a known base directory the path is
    /// relative to the working directory, like the config file's.
    fn resolve_path(base: Option<PathBuf>) -> PathBuf {
        base.unwrap_or_else(|| PathBuf::from(".local").join("state"))
            .join("audio-control")
            .join("last_device")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Default for FileLastDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LastDeviceStore for FileLastDeviceStore {
    async fn load(&self) -> Result<Option<MacAddress>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::ReadFailed(e.to_string())),
        };

        let record = content.trim();
        if record.is_empty() {
            return Ok(None);
        }

        match record.parse() {
            Ok(mac) => Ok(Some(mac)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable last device record");
                Ok(None)
            }
        }
    }

    async fn save(&self, mac: &MacAddress) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        fs::write(&self.path, format!("{mac}\n"))
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }
}
