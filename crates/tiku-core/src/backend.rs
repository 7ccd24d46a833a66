use std::path::Path;

use tiku_types::{PhysicalRect, SurfaceGeometry};

use crate::error::{CaptureError, RecognitionError};

/// Screen pixels
#[async_trait::async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Encoded image of the whole screen at full resolution
    async fn capture_full_screen(&self) -> Result<Vec<u8>, CaptureError>;

    /// Cut `rect` out of an image produced by `capture_full_screen`
    async fn crop(&self, image: Vec<u8>, rect: PhysicalRect) -> Result<Vec<u8>, CaptureError>;
}

/// Optical text recognition
#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8], language_pack: &Path)
    -> Result<String, RecognitionError>;
}

/// Window plumbing the session drives: the main interaction surface and the
/// full-desktop selection overlay
pub trait Surfaces: Send + Sync {
    fn hide_primary(&self);

    fn show_primary(&self);

    /// Show the overlay and report where it sits and how it is scaled
    fn open_selection(&self) -> SurfaceGeometry;

    fn close_selection(&self);
}
