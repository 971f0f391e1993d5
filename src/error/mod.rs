use thiserror::Error;

use crate::client::ProcessingError;
use crate::clipboard::ClipboardError;
use crate::download::DownloadError;
use crate::intake::IntakeError;
use crate::workflow::WorkflowError;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}
