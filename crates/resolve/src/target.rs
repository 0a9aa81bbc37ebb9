use canvasfit_common::{BufferSize, LayoutSize, SurfaceId};

/// A visible drawing region.
pub trait Surface {
    /// Registry key of this surface.
    fn id(&self) -> SurfaceId;

    /// Size the surface reports on its own, used until an observation arrives.
    fn intrinsic_size(&self) -> LayoutSize;
}

impl<S: Surface + ?Sized> Surface for &S {
    fn id(&self) -> SurfaceId {
        (**self).id()
    }

    fn intrinsic_size(&self) -> LayoutSize {
        (**self).intrinsic_size()
    }
}

/// Something a rendering backend draws into, backed by a surface.
pub trait RenderTarget {
    type Surface: Surface + ?Sized;

    /// The surface whose size drives this target.
    fn surface(&self) -> &Self::Surface;

    /// Current backing buffer resolution.
    fn buffer_size(&self) -> BufferSize;

    /// Set the backing buffer resolution. Presentation size is left alone.
    fn set_buffer_size(&mut self, size: BufferSize);
}

/// Surface with a fixed intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSurface {
    pub id: SurfaceId,
    pub size: LayoutSize,
}

impl StaticSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            id: SurfaceId::new(),
            size: LayoutSize::new(width, height),
        }
    }
}

impl Surface for StaticSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn intrinsic_size(&self) -> LayoutSize {
        self.size
    }
}

/// In-memory render target.
///
/// Records the buffer size it was given and how many times it actually
/// changed. Starts at 1x1, the smallest valid buffer.
#[derive(Debug, Clone)]
pub struct BufferTarget<S> {
    surface: S,
    size: BufferSize,
    resize_count: u32,
}

impl<S: Surface> BufferTarget<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            size: BufferSize::new(1, 1),
            resize_count: 0,
        }
    }

    /// Number of `set_buffer_size` calls that changed the size.
    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }
}

impl<S: Surface> RenderTarget for BufferTarget<S> {
    type Surface = S;

    fn surface(&self) -> &S {
        &self.surface
    }

    fn buffer_size(&self) -> BufferSize {
        self.size
    }

    fn set_buffer_size(&mut self, size: BufferSize) {
        if size != self.size {
            self.size = size;
            self.resize_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_target_counts_real_changes() {
        let mut target = BufferTarget::new(StaticSurface::new(10.0, 10.0));
        assert_eq!(target.buffer_size(), BufferSize::new(1, 1));

        target.set_buffer_size(BufferSize::new(10, 10));
        target.set_buffer_size(BufferSize::new(10, 10));
        target.set_buffer_size(BufferSize::new(20, 10));
        assert_eq!(target.resize_count(), 2);
        assert_eq!(target.buffer_size(), BufferSize::new(20, 10));
    }

    #[test]
    fn surface_by_reference() {
        fn describe<S: Surface>(s: S) -> (SurfaceId, LayoutSize) {
            (s.id(), s.intrinsic_size())
        }

        let surface = StaticSurface::new(3.0, 4.0);
        assert_eq!(describe(&surface), (surface.id, LayoutSize::new(3.0, 4.0)));
    }
}
