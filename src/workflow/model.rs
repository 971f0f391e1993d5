use std::sync::Arc;

use crate::intake::CandidateImage;
use crate::ledger::PreviewHandle;

pub const BORDER_THICKNESS_MIN: u8 = 1;
pub const BORDER_THICKNESS_MAX: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Border color with opacity. Opacity lives in 0.0–1.0 and is clamped on
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const OPAQUE_WHITE: Self = Self { r: 255, g: 255, b: 255, a: 1.0 };

    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }
}

/// User-chosen styling for the next processing request. Orthogonal to the
/// workflow state; edits during an in-flight request only affect the next
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleParameters {
    border_thickness: u8,
    border_color: Rgba,
    background_color: Rgb,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            border_thickness: 5,
            border_color: Rgba::OPAQUE_WHITE,
            background_color: Rgb::WHITE,
        }
    }
}

impl StyleParameters {
    pub fn border_thickness(&self) -> u8 {
        self.border_thickness
    }

    pub fn border_color(&self) -> Rgba {
        self.border_color
    }

    pub fn background_color(&self) -> Rgb {
        self.background_color
    }

    pub fn set_border_thickness(&mut self, value: u8) {
        self.border_thickness = value.clamp(BORDER_THICKNESS_MIN, BORDER_THICKNESS_MAX);
    }

    pub fn set_border_color(&mut self, color: Rgba) {
        self.border_color = Rgba::new(color.r, color.g, color.b, color.a);
    }

    pub fn set_background_color(&mut self, color: Rgb) {
        self.background_color = color;
    }
}

/// Binary payload returned by the sticker service, retained verbatim for
/// download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSticker {
    bytes: Arc<[u8]>,
}

impl ProcessedSticker {
    pub fn new(bytes: Arc<[u8]>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

/// Discriminant of [`WorkflowState`], used for logging and transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    NoSelection,
    Selected,
    Processing,
    Completed,
    Failed,
}

/// Exactly one workflow state is live per session.
#[derive(Debug)]
pub enum WorkflowState {
    NoSelection,
    Selected {
        image: CandidateImage,
        original: PreviewHandle,
    },
    Processing {
        image: CandidateImage,
        original: PreviewHandle,
    },
    Completed {
        image: CandidateImage,
        original: PreviewHandle,
        sticker: ProcessedSticker,
        processed: PreviewHandle,
    },
    Failed {
        image: CandidateImage,
        original: PreviewHandle,
        reason: String,
    },
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            Self::NoSelection => WorkflowPhase::NoSelection,
            Self::Selected { .. } => WorkflowPhase::Selected,
            Self::Processing { .. } => WorkflowPhase::Processing,
            Self::Completed { .. } => WorkflowPhase::Completed,
            Self::Failed { .. } => WorkflowPhase::Failed,
        }
    }

    pub fn candidate(&self) -> Option<&CandidateImage> {
        match self {
            Self::NoSelection => None,
            Self::Selected { image, .. }
            | Self::Processing { image, .. }
            | Self::Completed { image, .. }
            | Self::Failed { image, .. } => Some(image),
        }
    }

    pub fn original_handle(&self) -> Option<PreviewHandle> {
        match self {
            Self::NoSelection => None,
            Self::Selected { original, .. }
            | Self::Processing { original, .. }
            | Self::Completed { original, .. }
            | Self::Failed { original, .. } => Some(*original),
        }
    }

    pub fn processed_handle(&self) -> Option<PreviewHandle> {
        match self {
            Self::Completed { processed, .. } => Some(*processed),
            _ => None,
        }
    }

    pub fn sticker(&self) -> Option<&ProcessedSticker> {
        match self {
            Self::Completed { sticker, .. } => Some(sticker),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
