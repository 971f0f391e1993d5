use thiserror::Error;

use crate::validate::ValidationError;

use super::command::CommandKind;
use super::model::WorkflowPhase;

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("command {command:?} is not allowed while {phase:?}")]
    InvalidCommand {
        phase: WorkflowPhase,
        command: CommandKind,
    },
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}
