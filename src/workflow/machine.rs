use std::mem;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::client::ProcessingError;
use crate::intake::CandidateImage;
use crate::ledger::{HandleRole, ResourceLedger};
use crate::naming;
use crate::validate;

use super::command::{CommandKind, PhaseTransition};
use super::error::{WorkflowError, WorkflowResult};
use super::model::{ProcessedSticker, StyleParameters, WorkflowPhase, WorkflowState};

const PROCESSING_MESSAGE: &str = "Processing your image...";
const SUCCESS_MESSAGE: &str = "Image processed successfully!";
const FAILURE_MESSAGE: &str = "Failed to process image. Please try again.";

/// Snapshot handed to the processing worker when a request starts. Style
/// edits made afterwards only affect the next request.
#[derive(Debug, Clone)]
pub struct ProcessingJob {
    pub image: CandidateImage,
    pub style: StyleParameters,
}

/// The state-owning half of a sticker session: current selection, preview
/// handles, processing status and style parameters. All preview resources are
/// acquired and released here and nowhere else.
#[derive(Debug)]
pub struct WorkflowController {
    state: WorkflowState,
    style: StyleParameters,
    ledger: ResourceLedger,
    status_message: Option<&'static str>,
    transition_history: Vec<PhaseTransition>,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::NoSelection,
            style: StyleParameters::default(),
            ledger: ResourceLedger::new(),
            status_message: None,
            transition_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn style(&self) -> &StyleParameters {
        &self.style
    }

    pub fn status_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed { reason, .. } => Some(reason),
            _ => self.status_message,
        }
    }

    /// Accepts a validated candidate and enters `Selected`, releasing the
    /// previous session's handles first. Rejected while a request is in
    /// flight; invalid candidates leave the state untouched.
    pub fn select_file(&mut self, candidate: CandidateImage) -> WorkflowResult<()> {
        let from = self.phase();
        if from == WorkflowPhase::Processing {
            return Err(self.rejected(CommandKind::SelectFile));
        }

        validate::validate(&candidate)?;

        let previous = mem::replace(&mut self.state, WorkflowState::NoSelection);
        self.release_handles_of(previous);

        let original = self
            .ledger
            .acquire(HandleRole::Original, Arc::clone(candidate.bytes()));
        tracing::debug!(
            file_name = candidate.file_name(),
            mime_type = candidate.mime_type(),
            size = candidate.size(),
            "candidate selected"
        );
        self.state = WorkflowState::Selected {
            image: candidate,
            original,
        };
        self.status_message = None;
        self.record(from, CommandKind::SelectFile);
        Ok(())
    }

    /// Replaces the style parameters wholesale. Accepted in every phase;
    /// edits made while processing apply to the next request only.
    pub fn update_style(&mut self, style: StyleParameters) {
        self.style = style;
    }

    pub fn set_border_thickness(&mut self, value: u8) {
        self.style.set_border_thickness(value);
    }

    pub fn set_border_color(&mut self, color: super::model::Rgba) {
        self.style.set_border_color(color);
    }

    pub fn set_background_color(&mut self, color: super::model::Rgb) {
        self.style.set_background_color(color);
    }

    /// Enters `Processing` and returns the job snapshot the caller must run
    /// exactly once. Allowed from `Selected`, and re-entrant from `Failed`
    /// (retry) and `Completed` (re-process with the current parameters, the
    /// stale processed handle is released first). At most one job may be in
    /// flight; a second request while processing is rejected.
    pub fn begin_processing(&mut self) -> WorkflowResult<ProcessingJob> {
        let from = self.phase();
        let previous = match from {
            WorkflowPhase::Selected | WorkflowPhase::Failed | WorkflowPhase::Completed => {
                mem::replace(&mut self.state, WorkflowState::NoSelection)
            }
            WorkflowPhase::NoSelection | WorkflowPhase::Processing => {
                return Err(self.rejected(CommandKind::StartProcessing));
            }
        };

        let (image, original) = match previous {
            WorkflowState::Selected { image, original }
            | WorkflowState::Failed {
                image, original, ..
            } => (image, original),
            WorkflowState::Completed {
                image,
                original,
                processed,
                ..
            } => {
                self.ledger.release(processed);
                (image, original)
            }
            WorkflowState::NoSelection | WorkflowState::Processing { .. } => {
                unreachable!("phases without a selection are rejected above")
            }
        };

        let job = ProcessingJob {
            image: image.clone(),
            style: self.style,
        };
        self.state = WorkflowState::Processing { image, original };
        self.status_message = Some(PROCESSING_MESSAGE);
        self.record(from, CommandKind::StartProcessing);
        Ok(job)
    }

    /// Posts the single outcome of an in-flight job back into the machine.
    pub fn finish_processing(
        &mut self,
        outcome: Result<Vec<u8>, ProcessingError>,
    ) -> WorkflowResult<WorkflowPhase> {
        let from = self.phase();
        if from != WorkflowPhase::Processing {
            return Err(self.rejected(CommandKind::FinishProcessing));
        }

        let WorkflowState::Processing { image, original } =
            mem::replace(&mut self.state, WorkflowState::NoSelection)
        else {
            unreachable!("phase was checked to be Processing");
        };

        match outcome {
            Ok(bytes) => {
                let bytes: Arc<[u8]> = bytes.into();
                let processed = self
                    .ledger
                    .acquire(HandleRole::Processed, Arc::clone(&bytes));
                self.state = WorkflowState::Completed {
                    image,
                    original,
                    sticker: ProcessedSticker::new(bytes),
                    processed,
                };
                self.status_message = Some(SUCCESS_MESSAGE);
            }
            Err(err) => {
                // Diagnostics keep the cause; the user sees the generic message.
                tracing::warn!(%err, "sticker processing failed");
                self.state = WorkflowState::Failed {
                    image,
                    original,
                    reason: FAILURE_MESSAGE.to_string(),
                };
                self.status_message = None;
            }
        }

        self.record(from, CommandKind::FinishProcessing);
        Ok(self.phase())
    }

    /// Discards the session: releases every live preview handle, restores the
    /// default style and returns to `NoSelection`. A no-op when nothing is
    /// selected; rejected while a request is in flight.
    pub fn reset(&mut self) -> WorkflowResult<()> {
        let from = self.phase();
        match from {
            WorkflowPhase::Processing => return Err(self.rejected(CommandKind::Reset)),
            WorkflowPhase::NoSelection => return Ok(()),
            WorkflowPhase::Selected | WorkflowPhase::Completed | WorkflowPhase::Failed => {}
        }

        let previous = mem::replace(&mut self.state, WorkflowState::NoSelection);
        self.release_handles_of(previous);
        self.style = StyleParameters::default();
        self.status_message = None;
        self.record(from, CommandKind::Reset);
        Ok(())
    }

    /// Bytes of the original candidate's live preview, for rendering.
    pub fn original_preview(&self) -> Option<&Arc<[u8]>> {
        self.state
            .original_handle()
            .and_then(|handle| self.ledger.bytes(handle))
    }

    /// Bytes of the processed sticker's live preview, for rendering.
    pub fn processed_preview(&self) -> Option<&Arc<[u8]>> {
        self.state
            .processed_handle()
            .and_then(|handle| self.ledger.bytes(handle))
    }

    /// Verbatim processed payload, present once the workflow completed.
    pub fn sticker_bytes(&self) -> Option<&[u8]> {
        self.state.sticker().map(|sticker| sticker.bytes().as_ref())
    }

    /// Download name for the completed sticker at the given instant.
    pub fn download_file_name(&self, now: DateTime<Utc>) -> Option<String> {
        match &self.state {
            WorkflowState::Completed { image, .. } => {
                Some(naming::sticker_file_name(image.file_name(), now))
            }
            _ => None,
        }
    }

    pub fn live_handles(&self) -> usize {
        self.ledger.live_count()
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    fn release_handles_of(&mut self, state: WorkflowState) {
        if let Some(original) = state.original_handle() {
            self.ledger.release(original);
        }
        if let Some(processed) = state.processed_handle() {
            self.ledger.release(processed);
        }
    }

    fn rejected(&self, command: CommandKind) -> WorkflowError {
        let phase = self.phase();
        tracing::warn!(?phase, ?command, "workflow command rejected");
        WorkflowError::InvalidCommand { phase, command }
    }

    fn record(&mut self, from: WorkflowPhase, command: CommandKind) {
        let to = self.phase();
        tracing::debug!(?from, ?command, ?to, "workflow transition");
        self.transition_history
            .push(PhaseTransition::new(from, command, to));
    }
}

impl Default for WorkflowController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl WorkflowController {
    fn history(&self) -> &[PhaseTransition] {
        &self.transition_history
    }
}
