use crate::intake::CandidateImage;

use super::model::{Rgb, Rgba, StyleParameters, WorkflowPhase};

/// Message surface the view layer drives the workflow through. Every user
/// affordance maps to exactly one command.
#[derive(Debug, Clone)]
pub enum WorkflowCommand {
    SelectFile(CandidateImage),
    PasteFromClipboard,
    UpdateStyle(StyleParameters),
    SetBorderThickness(u8),
    SetBorderColor(Rgba),
    SetBackgroundColor(Rgb),
    StartProcessing,
    SaveSticker,
    Reset,
}

impl WorkflowCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::SelectFile(_) | Self::PasteFromClipboard => CommandKind::SelectFile,
            Self::UpdateStyle(_)
            | Self::SetBorderThickness(_)
            | Self::SetBorderColor(_)
            | Self::SetBackgroundColor(_) => CommandKind::UpdateStyle,
            Self::StartProcessing => CommandKind::StartProcessing,
            Self::SaveSticker => CommandKind::SaveSticker,
            Self::Reset => CommandKind::Reset,
        }
    }
}

/// Payload-free command discriminant, used in transition errors and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    SelectFile,
    UpdateStyle,
    StartProcessing,
    FinishProcessing,
    SaveSticker,
    Reset,
}

/// One recorded phase transition of a workflow session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: WorkflowPhase,
    pub command: CommandKind,
    pub to: WorkflowPhase,
}

impl PhaseTransition {
    pub fn new(from: WorkflowPhase, command: CommandKind, to: WorkflowPhase) -> Self {
        Self { from, command, to }
    }
}
