use std::io;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::intake::CandidateImage;

const WL_PASTE_COMMAND: &str = "wl-paste";
const IMAGE_MIME_PREFIX: &str = "image/";
const PASTED_IMAGE_STEM: &str = "pasted-image";
const EMPTY_CLIPBOARD_MESSAGE: &str = "No selection";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to run clipboard command: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("clipboard access denied: {message}")]
    AccessDenied { message: String },
    #[error("clipboard returned an empty payload for {mime_type}")]
    EmptyPayload { mime_type: String },
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Read side of the system clipboard. Split behind a trait so the scan and
/// extraction logic stays testable without a running compositor.
pub trait PasteBackend {
    /// Payload type identifiers currently offered by the clipboard, in offer
    /// order. An empty clipboard yields an empty list, not an error.
    fn list_types(&self) -> ClipboardResult<Vec<String>>;
    fn read_payload(&self, mime_type: &str) -> ClipboardResult<Vec<u8>>;
}

#[derive(Debug, Default)]
pub struct WlPasteBackend;

impl PasteBackend for WlPasteBackend {
    fn list_types(&self) -> ClipboardResult<Vec<String>> {
        let output = run_wl_paste(&["--list-types"])?;
        match output {
            WlPasteOutput::Payload(bytes) => Ok(String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_owned)
                .filter(|line| !line.is_empty())
                .collect()),
            WlPasteOutput::EmptyClipboard => Ok(Vec::new()),
        }
    }

    fn read_payload(&self, mime_type: &str) -> ClipboardResult<Vec<u8>> {
        let output = run_wl_paste(&["--type", mime_type])?;
        match output {
            WlPasteOutput::Payload(bytes) => Ok(bytes),
            WlPasteOutput::EmptyClipboard => Err(ClipboardError::EmptyPayload {
                mime_type: mime_type.to_string(),
            }),
        }
    }
}

enum WlPasteOutput {
    Payload(Vec<u8>),
    EmptyClipboard,
}

fn run_wl_paste(args: &[&str]) -> ClipboardResult<WlPasteOutput> {
    let output = Command::new(WL_PASTE_COMMAND)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| ClipboardError::CommandIo {
            command: WL_PASTE_COMMAND.to_string(),
            source: err,
        })?;

    if output.status.success() {
        return Ok(WlPasteOutput::Payload(output.stdout));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim();
    if message == EMPTY_CLIPBOARD_MESSAGE {
        return Ok(WlPasteOutput::EmptyClipboard);
    }

    Err(ClipboardError::AccessDenied {
        message: format!("{} ({})", message, output.status),
    })
}

/// Extracts an image payload from the system clipboard, if one is present.
///
/// Returns `Ok(None)` when the clipboard holds no image entry; that outcome
/// is normal and distinct from an access failure.
pub fn read_image() -> ClipboardResult<Option<CandidateImage>> {
    read_image_with(&WlPasteBackend)
}

pub fn read_image_with<B: PasteBackend>(backend: &B) -> ClipboardResult<Option<CandidateImage>> {
    let types = backend.list_types()?;
    let Some(mime_type) = types.iter().find(|entry| entry.starts_with(IMAGE_MIME_PREFIX)) else {
        tracing::debug!(offered = types.len(), "no image entry among clipboard payload types");
        return Ok(None);
    };

    let bytes = backend.read_payload(mime_type)?;
    let file_name = format!("{PASTED_IMAGE_STEM}.{}", mime_subtype(mime_type));
    tracing::debug!(mime_type = %mime_type, size = bytes.len(), "extracted clipboard image");
    Ok(Some(CandidateImage::new(bytes, mime_type.clone(), file_name)))
}

fn mime_subtype(mime_type: &str) -> &str {
    mime_type
        .split('/')
        .nth(1)
        .map(|subtype| subtype.split(';').next().unwrap_or(subtype))
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakePasteBackend {
        types: ClipboardResult<Vec<String>>,
        payload: Vec<u8>,
        requested_types: RefCell<Vec<String>>,
    }

    impl FakePasteBackend {
        fn offering(types: &[&str], payload: &[u8]) -> Self {
            Self {
                types: Ok(types.iter().map(|entry| entry.to_string()).collect()),
                payload: payload.to_vec(),
                requested_types: RefCell::new(Vec::new()),
            }
        }

        fn denied(message: &str) -> Self {
            Self {
                types: Err(ClipboardError::AccessDenied {
                    message: message.to_string(),
                }),
                payload: Vec::new(),
                requested_types: RefCell::new(Vec::new()),
            }
        }
    }

    impl PasteBackend for FakePasteBackend {
        fn list_types(&self) -> ClipboardResult<Vec<String>> {
            match &self.types {
                Ok(types) => Ok(types.clone()),
                Err(ClipboardError::AccessDenied { message }) => Err(ClipboardError::AccessDenied {
                    message: message.clone(),
                }),
                Err(_) => unreachable!("fake only produces access denials"),
            }
        }

        fn read_payload(&self, mime_type: &str) -> ClipboardResult<Vec<u8>> {
            self.requested_types.borrow_mut().push(mime_type.to_string());
            Ok(self.payload.clone())
        }
    }

    #[test]
    fn first_image_type_wins_and_names_the_candidate() {
        let backend = FakePasteBackend::offering(
            &["text/plain", "image/png", "image/jpeg"],
            b"png-payload",
        );

        let candidate = read_image_with(&backend)
            .expect("read should succeed")
            .expect("an image entry exists");

        assert_eq!(candidate.mime_type(), "image/png");
        assert_eq!(candidate.file_name(), "pasted-image.png");
        assert_eq!(candidate.bytes().as_ref(), b"png-payload");
        assert_eq!(backend.requested_types.borrow().as_slice(), ["image/png"]);
    }

    #[test]
    fn absence_of_image_entries_is_not_an_error() {
        let backend = FakePasteBackend::offering(&["text/plain", "text/html"], b"");
        let outcome = read_image_with(&backend).expect("read should succeed");
        assert!(outcome.is_none());
        assert!(backend.requested_types.borrow().is_empty());
    }

    #[test]
    fn empty_clipboard_is_not_an_error() {
        let backend = FakePasteBackend::offering(&[], b"");
        let outcome = read_image_with(&backend).expect("read should succeed");
        assert!(outcome.is_none());
    }

    #[test]
    fn access_denial_surfaces_as_an_error() {
        let backend = FakePasteBackend::denied("compositor refused the request");
        let err = read_image_with(&backend).expect_err("denial should bubble");
        assert!(matches!(err, ClipboardError::AccessDenied { message: _ }));
    }

    #[test]
    fn mime_subtype_strips_parameters() {
        assert_eq!(mime_subtype("image/png"), "png");
        assert_eq!(mime_subtype("image/webp"), "webp");
        assert_eq!(mime_subtype("image/png;charset=binary"), "png");
        assert_eq!(mime_subtype("garbage"), "bin");
    }
}
