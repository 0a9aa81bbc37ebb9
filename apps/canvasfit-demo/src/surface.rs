use canvasfit_common::{LayoutSize, SurfaceId};
use canvasfit_observe::ResizeEntry;
use canvasfit_resolve::Surface;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// A winit window as an observed surface.
///
/// Layout sizes are logical pixels, so a multiplier equal to the scale factor
/// maps them back to physical pixels.
pub struct ObservedWindow {
    id: SurfaceId,
    window: Arc<Window>,
}

impl ObservedWindow {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            id: SurfaceId::new(),
            window,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    /// Notification entry for a `Resized` event.
    pub fn resize_entry(&self, physical: PhysicalSize<u32>) -> ResizeEntry {
        let size = logical_size(physical, self.scale_factor());
        ResizeEntry::new(self.id, size.width, size.height)
    }
}

impl Surface for ObservedWindow {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn intrinsic_size(&self) -> LayoutSize {
        logical_size(self.window.inner_size(), self.scale_factor())
    }
}

fn logical_size(physical: PhysicalSize<u32>, scale_factor: f64) -> LayoutSize {
    let logical = physical.to_logical::<f64>(scale_factor);
    LayoutSize::new(logical.width, logical.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_divides_by_scale_factor() {
        let size = logical_size(PhysicalSize::new(1600, 1200), 2.0);
        assert_eq!(size, LayoutSize::new(800.0, 600.0));
    }

    #[test]
    fn logical_size_keeps_fractions() {
        let size = logical_size(PhysicalSize::new(1001, 500), 2.0);
        assert_eq!(size, LayoutSize::new(500.5, 250.0));
    }
}
