use tiku_types::{LogicalRect, PhysicalRect, ScaleFactor, WindowOrigin};

use crate::error::RegionError;

/// Map a window-relative logical selection to the physical-pixel rectangle to
/// crop from a full-screen capture.
///
/// The selection is first translated by the surface origin, then every field
/// is scaled and rounded on its own. Rounding never looks at a sum of fields,
/// so `width`/`height` do not drift with the selection's position. Degenerate
/// selections are converted as-is; only values that cannot be represented as
/// pixel coordinates are rejected.
pub fn transform(
    selection: LogicalRect,
    origin: WindowOrigin,
    scale: ScaleFactor,
) -> Result<PhysicalRect, RegionError> {
    let absolute = LogicalRect {
        x: selection.x + origin.x,
        y: selection.y + origin.y,
        width: selection.width,
        height: selection.height,
    };

    let s = scale.get();
    Ok(PhysicalRect {
        left: to_pixel("left", absolute.x * s)?,
        top: to_pixel("top", absolute.y * s)?,
        width: to_pixel("width", absolute.width * s)?,
        height: to_pixel("height", absolute.height * s)?,
    })
}

fn to_pixel(field: &'static str, value: f64) -> Result<u32, RegionError> {
    if !value.is_finite() {
        return Err(RegionError::NotFinite { field });
    }

    let rounded = value.round();
    if rounded < 0.0 {
        return Err(RegionError::Negative { field, value });
    }

    // Saturates above u32::MAX, far beyond any framebuffer
    Ok(rounded as u32)
}
