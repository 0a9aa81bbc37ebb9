use canvasfit_common::{BufferSize, DeviceLimits};
use canvasfit_resolve::{RenderTarget, Surface};

/// Limits to resolve against: the device's `max_texture_dimension_2d`,
/// optionally lowered to `cap`. A cap never raises the device limit.
pub fn device_limits(device: &wgpu::Device, cap: Option<u32>) -> DeviceLimits {
    capped(device.limits().max_texture_dimension_2d, cap)
}

fn capped(device_max: u32, cap: Option<u32>) -> DeviceLimits {
    DeviceLimits::new(cap.map_or(device_max, |c| c.min(device_max)))
}

/// A configured wgpu surface viewed as a render target.
///
/// The buffer size is the surface configuration's width and height. Setting
/// it reconfigures the swapchain; the window itself is never resized.
pub struct SurfaceTarget<'a, S: ?Sized> {
    element: &'a S,
    surface: &'a wgpu::Surface<'static>,
    device: &'a wgpu::Device,
    config: &'a mut wgpu::SurfaceConfiguration,
}

impl<'a, S: Surface + ?Sized> SurfaceTarget<'a, S> {
    pub fn new(
        element: &'a S,
        surface: &'a wgpu::Surface<'static>,
        device: &'a wgpu::Device,
        config: &'a mut wgpu::SurfaceConfiguration,
    ) -> Self {
        Self {
            element,
            surface,
            device,
            config,
        }
    }
}

impl<S: Surface + ?Sized> RenderTarget for SurfaceTarget<'_, S> {
    type Surface = S;

    fn surface(&self) -> &S {
        self.element
    }

    fn buffer_size(&self) -> BufferSize {
        BufferSize::new(self.config.width, self.config.height)
    }

    fn set_buffer_size(&mut self, size: BufferSize) {
        if size == self.buffer_size() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(self.device, self.config);
        tracing::debug!(size = %size, "surface reconfigured");
    }
}
