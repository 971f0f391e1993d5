use thiserror::Error;

use crate::intake::CandidateImage;

/// Declared types accepted from every input channel. Matched exactly against
/// the declared type, never against sniffed content.
pub const ACCEPTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// 10 MiB, inclusive.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload a valid image file (JPG, JPEG, PNG, or WebP)")]
    UnsupportedType { mime_type: String },
    #[error("File size must be less than 10MB")]
    TooLarge { size: u64 },
}

pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Advisory gate over a candidate's declared type and size. Pure; performs no
/// payload transformation.
pub fn validate(candidate: &CandidateImage) -> ValidationResult {
    if !ACCEPTED_MIME_TYPES.contains(&candidate.mime_type()) {
        return Err(ValidationError::UnsupportedType {
            mime_type: candidate.mime_type().to_string(),
        });
    }

    if candidate.size() > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size: candidate.size(),
        });
    }

    Ok(())
}
