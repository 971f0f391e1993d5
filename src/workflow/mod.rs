pub mod command;
pub mod error;
pub mod machine;
pub mod model;

pub use command::{CommandKind, PhaseTransition, WorkflowCommand};
pub use error::{WorkflowError, WorkflowResult};
pub use machine::{ProcessingJob, WorkflowController};
pub use model::{
    ProcessedSticker, Rgb, Rgba, StyleParameters, WorkflowPhase, WorkflowState,
    BORDER_THICKNESS_MAX, BORDER_THICKNESS_MIN,
};
