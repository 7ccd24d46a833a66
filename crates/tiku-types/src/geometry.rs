use serde::{Deserialize, Serialize};

/// Selection rectangle relative to the selection surface's own origin,
/// in logical (unscaled) pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Absolute position of the selection surface on the virtual desktop,
/// in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowOrigin {
    pub x: f64,
    pub y: f64,
}

impl WindowOrigin {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Physical pixels per logical pixel. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub const IDENTITY: ScaleFactor = ScaleFactor(1.0);

    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ScaleFactor::new(value).ok_or_else(|| format!("invalid scale factor: {value}"))
    }
}

impl From<ScaleFactor> for f64 {
    fn from(scale: ScaleFactor) -> Self {
        scale.0
    }
}

/// Rectangle to crop from a full-resolution capture, in physical pixels.
///
/// Persisted as `{ "x", "y", "width", "height" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalRect {
    #[serde(rename = "x")]
    pub left: u32,
    #[serde(rename = "y")]
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PhysicalRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }
}

/// Where the selection surface sits and how the display under it is scaled
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    pub origin: WindowOrigin,
    pub scale: ScaleFactor,
}
