//! ``src/fs/download_sink.rs``
//! ============================================================================
//! # Download Sink: the "save as" side effect of a download
//!
//! Bytes are first written to a temporary file inside the target directory,
//! then persisted under the original name. The temporary file is removed by
//! its destructor on every failure path, so a failed save leaves nothing
//! behind.

use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::AppError;

/// Platform save-as mechanism.
pub trait FileSaver: Send + Sync {
    /// Save `bytes` under `name`, returning the final location.
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}

/// Saves downloads into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Final path component of a server-provided name.
///
/// Server names are untrusted; anything that would escape the download
/// directory is reduced to its last component.
pub fn local_file_name(name: &str) -> Option<String> {
    let normalized = name.replace('\\', "/");
    let base = normalized.rsplit('/').next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => None,
        other => Some(other.to_string()),
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let file_name =
            local_file_name(name).ok_or_else(|| AppError::save_failed(name, "invalid file name"))?;

        std::fs::create_dir_all(&self.directory)
            .map_err(|e| AppError::save_failed(name, e.to_string()))?;

        let mut temp = NamedTempFile::new_in(&self.directory)
            .map_err(|e| AppError::save_failed(name, e.to_string()))?;
        debug!(temp = %temp.path().display(), "Staging download");

        temp.write_all(bytes)
            .and_then(|()| temp.flush())
            .map_err(|e| AppError::save_failed(name, e.to_string()))?;

        let target = self.directory.join(&file_name);
        temp.persist(&target)
            .map_err(|e| AppError::save_failed(name, e.error.to_string()))?;

        info!(target = %target.display(), bytes = bytes.len(), "Download saved");
        Ok(target)
    }
}
