use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config;
use crate::naming;

const DOWNLOAD_SUBDIR: &str = "Pictures";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Writes completed stickers to disk under their derived download name.
#[derive(Debug, Clone)]
pub struct DownloadService {
    target_dir: PathBuf,
}

impl DownloadService {
    pub const fn with_dir(target_dir: PathBuf) -> Self {
        Self { target_dir }
    }

    /// Resolves the target directory from `config.json`, defaulting to
    /// `$HOME/Pictures`.
    pub fn with_default_dir() -> DownloadResult<Self> {
        if let Some(dir) = config::load_app_config().download_dir {
            return Ok(Self::with_dir(dir));
        }
        let home = std::env::var("HOME").map_err(|_| DownloadError::MissingHomeDirectory)?;
        let mut target_dir = PathBuf::from(home);
        target_dir.push(DOWNLOAD_SUBDIR);
        Ok(Self::with_dir(target_dir))
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Saves the verbatim processed bytes as
    /// `<stem>-sticker-<timestamp>.png` inside the target directory,
    /// creating the directory if needed.
    pub fn save_sticker(
        &self,
        bytes: &[u8],
        original_name: &str,
        now: DateTime<Utc>,
    ) -> DownloadResult<PathBuf> {
        let file_name = naming::sticker_file_name(original_name, now);
        let mut path = self.target_dir.clone();
        path.push(&file_name);

        fs::create_dir_all(&self.target_dir)?;
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), size = bytes.len(), "saved sticker");
        Ok(path)
    }
}
