use serde::{Deserialize, Serialize};

use crate::geometry::{LogicalRect, PhysicalRect};
use crate::knowledge::{Answer, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    DefineRegion,
    Recognize,
}

/// Commands consumed by the capture session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RequestDefineRegion(Category),
    RequestRecognize(Category),
    CancelSelection,
    SelectionCompleted(LogicalRect),
    RecognizeWithSavedRegion(Category),
    LoadRegion(Category),
    CloseAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Capture,
    Recognition,
    Selection,
}

/// Outcomes produced by the capture session for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    RegionSaved {
        category: Category,
        rect: PhysicalRect,
    },
    RegionLoaded {
        category: Category,
        rect: Option<PhysicalRect>,
    },
    NoRegionConfigured(Category),
    AnswerReady {
        answer: Answer,
        region: PhysicalRect,
    },
    RecognitionFailed {
        kind: FailureKind,
        reason: String,
    },
    SelectionCancelled,
    AnswerDismissed,
}
