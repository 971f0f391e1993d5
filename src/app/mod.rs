use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;

use crate::client::{HttpProcessor, ProcessingError, ProcessorBackend};
use crate::clipboard::{self, PasteBackend, WlPasteBackend};
use crate::download::DownloadService;
use crate::error::AppResult;
use crate::intake::{self, CandidateImage};
use crate::workflow::{
    CommandKind, StyleParameters, WorkflowCommand, WorkflowController, WorkflowError,
    WorkflowPhase,
};

type ProcessingOutcome = Result<Vec<u8>, ProcessingError>;

/// One interactive sticker session: the workflow state machine plus the
/// single in-flight processing worker and the input channels.
///
/// The session is single-threaded; the worker thread posts its one outcome
/// over a channel and the owning event loop pumps it back in through
/// [`StickerSession::poll`].
pub struct StickerSession<P: ProcessorBackend = HttpProcessor> {
    workflow: WorkflowController,
    processor: P,
    in_flight: Option<mpsc::Receiver<ProcessingOutcome>>,
}

impl StickerSession<HttpProcessor> {
    /// Session against the configured sticker service.
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_processor(HttpProcessor::from_config()?))
    }
}

impl<P> StickerSession<P>
where
    P: ProcessorBackend + Clone + Send + 'static,
{
    pub fn with_processor(processor: P) -> Self {
        Self {
            workflow: WorkflowController::new(),
            processor,
            in_flight: None,
        }
    }

    pub fn workflow(&self) -> &WorkflowController {
        &self.workflow
    }

    /// Command surface for the view layer.
    pub fn handle(&mut self, command: WorkflowCommand) -> AppResult<()> {
        match command {
            WorkflowCommand::SelectFile(candidate) => self.select_file(candidate),
            WorkflowCommand::PasteFromClipboard => self.paste_from_clipboard().map(|_| ()),
            WorkflowCommand::UpdateStyle(style) => {
                self.workflow.update_style(style);
                Ok(())
            }
            WorkflowCommand::SetBorderThickness(value) => {
                self.workflow.set_border_thickness(value);
                Ok(())
            }
            WorkflowCommand::SetBorderColor(color) => {
                self.workflow.set_border_color(color);
                Ok(())
            }
            WorkflowCommand::SetBackgroundColor(color) => {
                self.workflow.set_background_color(color);
                Ok(())
            }
            WorkflowCommand::StartProcessing => self.start_processing(),
            WorkflowCommand::SaveSticker => self.save_sticker().map(|_| ()),
            WorkflowCommand::Reset => self.reset(),
        }
    }

    pub fn select_file(&mut self, candidate: CandidateImage) -> AppResult<()> {
        self.workflow.select_file(candidate)?;
        Ok(())
    }

    /// Drag-and-drop / file-picker channel.
    pub fn select_path(&mut self, path: &Path) -> AppResult<()> {
        let candidate = intake::from_path(path)?;
        self.select_file(candidate)
    }

    /// Clipboard channel. `Ok(false)` means the clipboard held no image,
    /// which is a normal outcome, not an error.
    pub fn paste_from_clipboard(&mut self) -> AppResult<bool> {
        self.paste_from_clipboard_with(&WlPasteBackend)
    }

    pub fn paste_from_clipboard_with<B: PasteBackend>(&mut self, backend: &B) -> AppResult<bool> {
        match clipboard::read_image_with(backend)? {
            Some(candidate) => {
                self.select_file(candidate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_style(&mut self, style: StyleParameters) {
        self.workflow.update_style(style);
    }

    /// Kicks off the single processing request for the current selection.
    /// The job snapshot runs on a worker thread; completion is observed via
    /// [`StickerSession::poll`] or [`StickerSession::wait_for_outcome`].
    pub fn start_processing(&mut self) -> AppResult<()> {
        let job = self.workflow.begin_processing()?;
        let processor = self.processor.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(processor.process(&job.image, &job.style));
        });

        self.in_flight = Some(rx);
        Ok(())
    }

    /// Non-blocking pump: feeds a finished outcome into the workflow.
    /// Returns the phase entered when an outcome arrived, `None` while the
    /// request is still in flight or none exists.
    pub fn poll(&mut self) -> AppResult<Option<WorkflowPhase>> {
        let Some(rx) = &self.in_flight else {
            return Ok(None);
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::TryRecvError::Empty) => return Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ProcessingError::Interrupted),
        };

        self.in_flight = None;
        let phase = self.workflow.finish_processing(outcome)?;
        Ok(Some(phase))
    }

    /// Blocking variant of [`StickerSession::poll`] for embeddings without
    /// an event loop.
    pub fn wait_for_outcome(&mut self, timeout: Duration) -> AppResult<Option<WorkflowPhase>> {
        let Some(rx) = &self.in_flight else {
            return Ok(None);
        };

        let outcome = match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => return Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ProcessingError::Interrupted),
        };

        self.in_flight = None;
        let phase = self.workflow.finish_processing(outcome)?;
        Ok(Some(phase))
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.workflow.reset()?;
        Ok(())
    }

    /// Saves the completed sticker into the configured download directory.
    pub fn save_sticker(&self) -> AppResult<PathBuf> {
        self.save_sticker_with(&DownloadService::with_default_dir()?)
    }

    pub fn save_sticker_with(&self, service: &DownloadService) -> AppResult<PathBuf> {
        let (Some(bytes), Some(image)) =
            (self.workflow.sticker_bytes(), self.workflow.state().candidate())
        else {
            return Err(WorkflowError::InvalidCommand {
                phase: self.workflow.phase(),
                command: CommandKind::SaveSticker,
            }
            .into());
        };

        let path = service.save_sticker(bytes, image.file_name(), Utc::now())?;
        Ok(path)
    }
}
