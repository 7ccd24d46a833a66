use std::io::Cursor;

use anyhow::{Context, Result, bail};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tiku_core::backend::ScreenCapture;
use tiku_core::error::CaptureError;
use tiku_types::{PhysicalRect, ScaleFactor, SurfaceGeometry, WindowOrigin};
use xcap::Monitor;

fn primary_monitor() -> Result<Monitor> {
    let mut monitors = Monitor::all().context("Failed to get monitors")?;
    if monitors.is_empty() {
        bail!("No monitor found");
    }

    let primary = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
    Ok(monitors.swap_remove(primary))
}

/// One monitor's screenshot and where it sits on the desktop, in physical
/// pixels
pub struct Tile {
    pub x: i64,
    pub y: i64,
    pub image: RgbaImage,
}

/// Paint every tile onto one canvas whose pixel (0, 0) is the desktop
/// origin. Pixels left of or above the origin are clipped since no region
/// can start there.
pub fn compose_desktop(tiles: &[Tile]) -> Result<RgbaImage> {
    let width = tiles
        .iter()
        .map(|t| t.x + t.image.width() as i64)
        .max()
        .unwrap_or(0);
    let height = tiles
        .iter()
        .map(|t| t.y + t.image.height() as i64)
        .max()
        .unwrap_or(0);
    if width <= 0 || height <= 0 {
        bail!("No monitor covers the desktop origin");
    }

    let mut canvas = RgbaImage::new(width as u32, height as u32);
    for tile in tiles {
        imageops::overlay(&mut canvas, &tile.image, tile.x, tile.y);
    }
    Ok(canvas)
}

/// Capture every monitor and lay them out as the virtual desktop, encoded as
/// PNG. Monitors are placed with the same origin times scale mapping the
/// selection overlay uses.
pub fn capture_desktop() -> Result<Vec<u8>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    if monitors.is_empty() {
        bail!("No monitor found");
    }

    let mut tiles = Vec::with_capacity(monitors.len());
    for monitor in &monitors {
        let captured = monitor.capture_image().context("Failed to capture screen")?;
        let (width, height) = (captured.width(), captured.height());
        let image = RgbaImage::from_raw(width, height, captured.into_raw())
            .context("Screenshot buffer does not match its size")?;

        let scale = monitor.scale_factor() as f64;
        tiles.push(Tile {
            x: (monitor.x() as f64 * scale).round() as i64,
            y: (monitor.y() as f64 * scale).round() as i64,
            image,
        });
    }

    let desktop = compose_desktop(&tiles)?;
    tracing::debug!(
        "Captured {}x{} desktop from {} monitors",
        desktop.width(),
        desktop.height(),
        tiles.len()
    );
    encode_png(DynamicImage::ImageRgba8(desktop))
}

/// Origin and scale of the primary monitor, where the selection overlay opens
pub fn primary_geometry() -> Result<SurfaceGeometry> {
    let monitor = primary_monitor()?;
    let scale = ScaleFactor::new(monitor.scale_factor() as f64).unwrap_or_default();

    Ok(SurfaceGeometry {
        origin: WindowOrigin::new(monitor.x() as f64, monitor.y() as f64),
        scale,
    })
}

/// Cut `rect` out of a PNG and re-encode it. The rect must lie fully inside
/// the image.
pub fn crop_png(png: &[u8], rect: PhysicalRect) -> Result<Vec<u8>> {
    let image = image::load_from_memory(png).context("Failed to decode screenshot")?;

    if rect.is_empty() {
        bail!("Region {rect:?} has no area");
    }
    if rect.right() > image.width() as u64 || rect.bottom() > image.height() as u64 {
        bail!(
            "Region {rect:?} exceeds the {}x{} screenshot",
            image.width(),
            image.height()
        );
    }

    encode_png(image.crop_imm(rect.left, rect.top, rect.width, rect.height))
}

fn encode_png(image: DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(buffer)
}

/// Screen capture through xcap. Capture APIs block, so both steps run on the
/// blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl XcapCapture {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ScreenCapture for XcapCapture {
    async fn capture_full_screen(&self) -> Result<Vec<u8>, CaptureError> {
        tokio::task::spawn_blocking(capture_desktop)
            .await
            .map_err(|e| CaptureError::Capture(format!("Capture task failed: {e}")))?
            .map_err(|e| CaptureError::Capture(format!("{e:#}")))
    }

    async fn crop(&self, image: Vec<u8>, rect: PhysicalRect) -> Result<Vec<u8>, CaptureError> {
        tokio::task::spawn_blocking(move || crop_png(&image, rect))
            .await
            .map_err(|e| CaptureError::Crop(format!("Crop task failed: {e}")))?
            .map_err(|e| CaptureError::Crop(format!("{e:#}")))
    }
}
