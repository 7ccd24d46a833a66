use std::time::Duration;

use tiku_types::FailureKind;

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("Transformed {field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("Transformed {field} is negative: {value}")]
    Negative { field: &'static str, value: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Crop failed: {0}")]
    Crop(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("Recognition engine failed: {0}")]
    Engine(String),

    #[error("No text recognized")]
    NoText,

    #[error("Recognition timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid region data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid knowledge file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Knowledge file must hold a JSON array")]
    NotAnArray,
}

/// Everything that can end a capture session early
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("Selection has no area")]
    EmptySelection,

    #[error("Selection cannot be mapped to the screen: {0}")]
    InvalidRegion(#[from] RegionError),
}

impl SessionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SessionError::Capture(_) => FailureKind::Capture,
            SessionError::Recognition(_) => FailureKind::Recognition,
            SessionError::EmptySelection
            | SessionError::InvalidRegion(_) => FailureKind::Selection,
        }
    }
}
