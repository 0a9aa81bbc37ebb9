use crate::target::{RenderTarget, Surface};
use canvasfit_common::{BufferSize, DeviceLimits, LayoutSize};
use canvasfit_observe::SizeObserverRegistry;

/// Multiplier that leaves layout pixels as buffer pixels.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Clamp one dimension into `[1, max]` and truncate it to whole pixels.
///
/// `NaN` and negative infinity land on 1, positive infinity on `max`.
/// A `max` of 0 is treated as 1.
pub fn clamp_dimension(value: f64, max: u32) -> u32 {
    let max = max.max(1);
    if value.is_nan() {
        return 1;
    }
    // In range and finite after the clamp, so the cast only truncates.
    value.clamp(1.0, f64::from(max)) as u32
}

/// Layout size of `surface`: the latest observation, or the surface's own size
/// when nothing has been observed yet.
///
/// Clamping can change the buffer's aspect ratio, so anything that must match
/// what is on screen (a camera projection) should use this rather than the
/// resolved buffer size.
pub fn layout_size<S>(registry: &SizeObserverRegistry, surface: &S) -> LayoutSize
where
    S: Surface + ?Sized,
{
    registry
        .observed_size(surface.id())
        .unwrap_or_else(|| surface.intrinsic_size())
}

/// Drawing-buffer size for `surface`.
///
/// Uses the latest observed layout size, or the surface's own size when no
/// observation has been recorded, scaled by `multiplier` and clamped per axis
/// to the device limit.
pub fn resolve_size<S>(
    registry: &SizeObserverRegistry,
    surface: &S,
    limits: DeviceLimits,
    multiplier: f64,
) -> BufferSize
where
    S: Surface + ?Sized,
{
    let layout = layout_size(registry, surface).scale(multiplier);
    let max = limits.max_dimension();
    BufferSize::new(
        clamp_dimension(layout.width, max),
        clamp_dimension(layout.height, max),
    )
}

/// Resolve the size for the surface backing `target` and make it the target's
/// buffer size. Returns the size applied.
pub fn apply_resize_to_surface<T>(
    registry: &SizeObserverRegistry,
    target: &mut T,
    limits: DeviceLimits,
    multiplier: f64,
) -> BufferSize
where
    T: RenderTarget + ?Sized,
{
    let size = resolve_size(registry, target.surface(), limits, multiplier);
    if size != target.buffer_size() {
        tracing::debug!(
            surface = %target.surface().id().short(),
            from = %target.buffer_size(),
            to = %size,
            "applying buffer size"
        );
    }
    target.set_buffer_size(size);
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{BufferTarget, StaticSurface};
    use canvasfit_observe::ResizeEntry;

    const M: DeviceLimits = DeviceLimits::new(4096);

    #[test]
    fn zero_intrinsic_size_clamps_to_one() {
        let reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(0.0, 0.0);
        assert_eq!(resolve_size(&reg, &surface, M, 1.0), BufferSize::new(1, 1));
    }

    #[test]
    fn oversized_axis_clamps_to_limit() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(10.0, 10.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 8000.0, 500.0)]);
        assert_eq!(
            resolve_size(&reg, &surface, M, 1.0),
            BufferSize::new(4096, 500)
        );
    }

    #[test]
    fn multiplier_scales_observed_size() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(10.0, 10.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 800.0, 600.0)]);
        assert_eq!(
            resolve_size(&reg, &surface, M, 2.0),
            BufferSize::new(1600, 1200)
        );
    }

    #[test]
    fn falls_back_to_intrinsic_size() {
        let reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        assert_eq!(
            resolve_size(&reg, &surface, M, 1.0),
            BufferSize::new(300, 150)
        );
    }

    #[test]
    fn registered_but_unobserved_uses_intrinsic_size() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        reg.register(surface.id);
        assert_eq!(
            resolve_size(&reg, &surface, M, 1.0),
            BufferSize::new(300, 150)
        );
    }

    #[test]
    fn observation_wins_over_intrinsic_size() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 640.0, 360.0)]);
        assert_eq!(
            resolve_size(&reg, &surface, M, 1.0),
            BufferSize::new(640, 360)
        );
    }

    #[test]
    fn degenerate_inputs_stay_in_range() {
        let reg = SizeObserverRegistry::new();
        let inputs = [
            -50.0,
            0.0,
            0.4,
            1.0,
            4095.9,
            4096.0,
            1e12,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ];
        let multipliers = [0.0, 0.5, 1.0, 3.0, -1.0, f64::NAN, f64::INFINITY];
        for max in [1, 2, 4096, u32::MAX] {
            let limits = DeviceLimits::new(max);
            for &w in &inputs {
                for &h in &inputs {
                    for &m in &multipliers {
                        let surface = StaticSurface::new(w, h);
                        let size = resolve_size(&reg, &surface, limits, m);
                        assert!(
                            (1..=max).contains(&size.width),
                            "max {max}: {w} {h} {m} -> {size}"
                        );
                        assert!(
                            (1..=max).contains(&size.height),
                            "max {max}: {w} {h} {m} -> {size}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn limit_of_one_collapses_everything_to_one() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 8000.0, 0.5)]);
        assert_eq!(
            resolve_size(&reg, &surface, DeviceLimits::new(1), 2.0),
            BufferSize::new(1, 1)
        );
    }

    #[test]
    fn one_axis_clamp_keeps_layout_aspect() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(10.0, 10.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 8000.0, 500.0)]);

        let buffer = resolve_size(&reg, &surface, M, 1.0);
        assert_eq!(buffer, BufferSize::new(4096, 500));
        assert!((buffer.aspect() - 8.192).abs() < 1e-4);

        let layout = layout_size(&reg, &surface);
        assert_eq!(layout, LayoutSize::new(8000.0, 500.0));
        assert_eq!(layout.width / layout.height, 16.0);
    }

    #[test]
    fn layout_size_falls_back_to_intrinsic() {
        let reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        assert_eq!(layout_size(&reg, &surface), LayoutSize::new(300.0, 150.0));
    }

    #[test]
    fn clamp_dimension_edges() {
        assert_eq!(clamp_dimension(f64::NAN, 10), 1);
        assert_eq!(clamp_dimension(f64::INFINITY, 10), 10);
        assert_eq!(clamp_dimension(f64::NEG_INFINITY, 10), 1);
        assert_eq!(clamp_dimension(7.9, 10), 7);
        assert_eq!(clamp_dimension(0.2, 10), 1);
        assert_eq!(clamp_dimension(5.0, 0), 1);
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(1.0, 1.0);
        reg.register(surface.id);
        reg.notify([ResizeEntry::new(surface.id, 1234.5, 678.9)]);
        let first = resolve_size(&reg, &surface, M, 1.5);
        let second = resolve_size(&reg, &surface, M, 1.5);
        assert_eq!(first, second);
    }

    #[test]
    fn apply_sets_target_buffer_only() {
        let mut reg = SizeObserverRegistry::new();
        let surface = StaticSurface::new(300.0, 150.0);
        let id = surface.id;
        reg.register(id);
        let mut target = BufferTarget::new(surface);

        let applied = apply_resize_to_surface(&reg, &mut target, M, 1.0);
        assert_eq!(applied, BufferSize::new(300, 150));
        assert_eq!(target.buffer_size(), applied);

        reg.notify([ResizeEntry::new(id, 5000.0, 200.0)]);
        let applied = apply_resize_to_surface(&reg, &mut target, M, 1.0);
        assert_eq!(applied, BufferSize::new(4096, 200));
        assert_eq!(target.resize_count(), 2);

        // Intrinsic size is what the surface reports; applying never changes it.
        assert_eq!(
            target.surface().intrinsic_size(),
            LayoutSize::new(300.0, 150.0)
        );
    }

    #[test]
    fn apply_every_frame_without_changes_is_stable() {
        let reg = SizeObserverRegistry::new();
        let mut target = BufferTarget::new(StaticSurface::new(64.0, 32.0));
        for _ in 0..5 {
            apply_resize_to_surface(&reg, &mut target, M, 1.0);
        }
        assert_eq!(target.resize_count(), 1);
    }
}
