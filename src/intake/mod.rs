use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A candidate image handed over by one of the input channels
/// (drag-and-drop, file picker, clipboard paste).
///
/// The byte payload is reference-counted so the copies handed to the
/// preview ledger and the processing worker stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImage {
    bytes: Arc<[u8]>,
    mime_type: String,
    file_name: String,
}

impl CandidateImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// Declared MIME type of the candidate. Derived from metadata, never
    /// sniffed from content.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to read image file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("dropped path {path} has no file name")]
    MissingFileName { path: PathBuf },
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;

/// Builds a candidate from a filesystem path, the shared entry point for the
/// drag-and-drop and file-picker channels.
///
/// The declared MIME type comes from the extension alone; unknown extensions
/// fall through as `application/octet-stream` so the validator rejects them
/// with the normal unsupported-type reason.
pub fn from_path(path: &Path) -> IntakeResult<CandidateImage> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| IntakeError::MissingFileName {
            path: path.to_path_buf(),
        })?;

    let bytes = std::fs::read(path).map_err(|err| IntakeError::ReadFile {
        path: path.to_path_buf(),
        source: err,
    })?;

    let mime_type = mime_type_for_extension(path).to_string();
    Ok(CandidateImage::new(bytes, mime_type, file_name))
}

fn mime_type_for_extension(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn from_path_reads_bytes_and_declares_type_from_extension() {
        let path = env::temp_dir().join("stickerlab-intake-test.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let candidate = from_path(&path).expect("intake should succeed");
        assert_eq!(candidate.file_name(), "stickerlab-intake-test.png");
        assert_eq!(candidate.mime_type(), "image/png");
        assert_eq!(candidate.bytes().as_ref(), b"png-bytes");
        assert_eq!(candidate.size(), 9);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn from_path_is_case_insensitive_on_extensions() {
        let path = env::temp_dir().join("stickerlab-intake-test.JPEG");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let candidate = from_path(&path).expect("intake should succeed");
        assert_eq!(candidate.mime_type(), "image/jpeg");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn from_path_falls_back_to_octet_stream_for_unknown_extensions() {
        let path = env::temp_dir().join("stickerlab-intake-test.gif");
        std::fs::write(&path, b"gif-bytes").unwrap();

        let candidate = from_path(&path).expect("intake should succeed");
        assert_eq!(candidate.mime_type(), "application/octet-stream");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn from_path_errors_on_missing_file() {
        let path = env::temp_dir().join("stickerlab-intake-does-not-exist.png");
        let err = from_path(&path).expect_err("missing file should error");
        assert!(matches!(err, IntakeError::ReadFile { path: _, source: _ }));
    }
}
