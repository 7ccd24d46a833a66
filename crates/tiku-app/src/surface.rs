use std::sync::atomic::{AtomicBool, Ordering};

use tiku_core::backend::Surfaces;
use tiku_types::SurfaceGeometry;

type GeometrySource = Box<dyn Fn() -> anyhow::Result<SurfaceGeometry> + Send + Sync>;

/// Terminal stand-in for the main window and the selection overlay. The
/// overlay covers the primary monitor; the user completes it with `select`.
pub struct ConsoleSurfaces {
    geometry: GeometrySource,
    primary_visible: AtomicBool,
    selecting: AtomicBool,
}

impl ConsoleSurfaces {
    pub fn new() -> Self {
        Self::with_geometry(Box::new(tiku_ocr::primary_geometry))
    }

    pub fn with_geometry(geometry: GeometrySource) -> Self {
        Self {
            geometry,
            primary_visible: AtomicBool::new(true),
            selecting: AtomicBool::new(false),
        }
    }

    pub fn primary_visible(&self) -> bool {
        self.primary_visible.load(Ordering::SeqCst)
    }

    pub fn selecting(&self) -> bool {
        self.selecting.load(Ordering::SeqCst)
    }
}

impl Surfaces for ConsoleSurfaces {
    fn hide_primary(&self) {
        self.primary_visible.store(false, Ordering::SeqCst);
        tracing::debug!("Main surface hidden");
    }

    fn show_primary(&self) {
        self.primary_visible.store(true, Ordering::SeqCst);
        tracing::debug!("Main surface shown");
    }

    fn open_selection(&self) -> SurfaceGeometry {
        let geometry = (self.geometry)().unwrap_or_else(|e| {
            tracing::warn!("Monitor geometry unavailable, assuming origin 0,0 at 1x: {e:#}");
            SurfaceGeometry::default()
        });

        self.selecting.store(true, Ordering::SeqCst);
        println!(
            "Selecting on the screen at ({}, {}), scale {}: enter `select <x> <y> <w> <h>` or `cancel`",
            geometry.origin.x,
            geometry.origin.y,
            geometry.scale.get()
        );
        geometry
    }

    fn close_selection(&self) {
        self.selecting.store(false, Ordering::SeqCst);
        tracing::debug!("Selection overlay closed");
    }
}

#[cfg(test)]
mod tests {
    use tiku_types::{ScaleFactor, WindowOrigin};

    use super::*;

    fn secondary_monitor() -> anyhow::Result<SurfaceGeometry> {
        Ok(SurfaceGeometry {
            origin: WindowOrigin::new(1920.0, 0.0),
            scale: ScaleFactor::new(1.25).unwrap(),
        })
    }

    fn no_monitor() -> anyhow::Result<SurfaceGeometry> {
        anyhow::bail!("no monitors")
    }

    #[test]
    fn reports_monitor_geometry() {
        let surfaces = ConsoleSurfaces::with_geometry(Box::new(secondary_monitor));

        let geometry = surfaces.open_selection();
        assert_eq!(geometry.origin, WindowOrigin::new(1920.0, 0.0));
        assert_eq!(geometry.scale.get(), 1.25);
        assert!(surfaces.selecting());

        surfaces.close_selection();
        assert!(!surfaces.selecting());
    }

    #[test]
    fn falls_back_to_identity_geometry() {
        let surfaces = ConsoleSurfaces::with_geometry(Box::new(no_monitor));
        assert_eq!(surfaces.open_selection(), SurfaceGeometry::default());
    }

    #[test]
    fn tracks_primary_visibility() {
        let surfaces = ConsoleSurfaces::with_geometry(Box::new(secondary_monitor));
        assert!(surfaces.primary_visible());
        surfaces.hide_primary();
        assert!(!surfaces.primary_visible());
        surfaces.show_primary();
        assert!(surfaces.primary_visible());
    }
}
