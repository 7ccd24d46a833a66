mod capture;
mod hotkey;
mod ocr;

pub use capture::{Tile, XcapCapture, capture_desktop, compose_desktop, crop_png, primary_geometry};
pub use hotkey::{HotkeyAction, HotkeyManager, default_bindings};
pub use ocr::{TESSDATA_ENV, TesseractRecognizer};
