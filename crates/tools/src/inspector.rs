use canvasfit_common::{BufferSize, DeviceLimits, LayoutSize, SurfaceId};
use canvasfit_observe::SizeObserverRegistry;
use canvasfit_resolve::{Surface, resolve_size};
use serde::Serialize;

/// Surface inspector for developer tooling.
///
/// Read-only view of what the registry knows about a surface and what the
/// resolver would do with it.
pub struct SurfaceInspector;

impl SurfaceInspector {
    /// Produce a summary for one surface.
    pub fn summary<S: Surface + ?Sized>(
        registry: &SizeObserverRegistry,
        surface: &S,
        limits: DeviceLimits,
        multiplier: f64,
    ) -> SurfaceSummary {
        let observed = registry.observed_size(surface.id());
        let intrinsic = surface.intrinsic_size();
        let resolved = resolve_size(registry, surface, limits, multiplier);
        let wanted = observed.unwrap_or(intrinsic).scale(multiplier);
        let max = limits.max_dimension();

        SurfaceSummary {
            id: surface.id(),
            registered: registry.is_registered(surface.id()),
            observed,
            intrinsic,
            resolved,
            multiplier,
            max_dimension: max,
            clamped_width: f64::from(resolved.width) != wanted.width.trunc(),
            clamped_height: f64::from(resolved.height) != wanted.height.trunc(),
        }
    }
}

/// Snapshot of one surface's sizing state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSummary {
    pub id: SurfaceId,
    pub registered: bool,
    pub observed: Option<LayoutSize>,
    pub intrinsic: LayoutSize,
    pub resolved: BufferSize,
    pub multiplier: f64,
    pub max_dimension: u32,
    /// Whether the clamp changed the width beyond whole-pixel truncation.
    pub clamped_width: bool,
    pub clamped_height: bool,
}

impl SurfaceSummary {
    pub fn is_clamped(&self) -> bool {
        self.clamped_width || self.clamped_height
    }
}

impl std::fmt::Display for SurfaceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self.observed {
            Some(o) => format!("observed {:.1}x{:.1}", o.width, o.height),
            None => format!(
                "intrinsic {:.1}x{:.1}",
                self.intrinsic.width, self.intrinsic.height
            ),
        };
        write!(
            f,
            "Surface {}: {source} x{} -> {} (max {}{})",
            self.id.short(),
            self.multiplier,
            self.resolved,
            self.max_dimension,
            if self.is_clamped() { ", clamped" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvasfit_observe::ResizeEntry;
    use canvasfit_resolve::StaticSurface;

    #[test]
    fn summary_unobserved_surface() {
        let reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        let s = SurfaceInspector::summary(&reg, &surface, DeviceLimits::new(4096), 1.0);
        assert!(!s.registered);
        assert_eq!(s.observed, None);
        assert_eq!(s.resolved, BufferSize::new(300, 150));
        assert!(!s.is_clamped());
        assert!(s.to_string().contains("intrinsic 300.0x150.0"));
    }

    #[test]
    fn summary_reports_clamped_axis() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(1.0, 1.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 8000.0, 500.0)]);

        let s = SurfaceInspector::summary(&reg, &surface, DeviceLimits::new(4096), 1.0);
        assert!(s.registered);
        assert!(s.clamped_width);
        assert!(!s.clamped_height);
        assert_eq!(s.resolved, BufferSize::new(4096, 500));
        assert!(s.to_string().ends_with("(max 4096, clamped)"));
    }

    #[test]
    fn summary_fractional_size_is_not_clamped() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(1.0, 1.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 640.5, 360.25)]);

        let s = SurfaceInspector::summary(&reg, &surface, DeviceLimits::new(4096), 1.0);
        assert_eq!(s.resolved, BufferSize::new(640, 360));
        assert!(!s.is_clamped());
    }
}
