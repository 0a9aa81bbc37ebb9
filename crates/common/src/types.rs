use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a drawing surface.
///
/// This is the registry key for everything the observer records about a
/// surface. It never owns the surface itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and overlays.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Size of a surface as laid out by the platform, in unitless layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

impl LayoutSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Multiply both axes by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Resolution of the buffer a rendering backend draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

impl BufferSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Height is treated as at least 1.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl std::fmt::Display for BufferSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Limits reported by the rendering backend that constrain buffer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLimits {
    pub max_texture_dimension_2d: u32,
}

impl DeviceLimits {
    /// WebGPU's guaranteed minimum for `maxTextureDimension2D`.
    pub const DEFAULT_MAX_TEXTURE_DIMENSION_2D: u32 = 8192;

    pub const fn new(max_texture_dimension_2d: u32) -> Self {
        Self {
            max_texture_dimension_2d,
        }
    }

    /// Upper bound of the clamp interval. Never below 1, so `[1, max]` is
    /// never empty even for a zero limit.
    pub fn max_dimension(&self) -> u32 {
        self.max_texture_dimension_2d.max(1)
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_TEXTURE_DIMENSION_2D)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_id_uniqueness() {
        let a = SurfaceId::new();
        let b = SurfaceId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn layout_size_scale() {
        let s = LayoutSize::new(800.0, 600.0).scale(2.0);
        assert_eq!(s, LayoutSize::new(1600.0, 1200.0));
    }

    #[test]
    fn buffer_size_aspect_tolerates_zero_height() {
        assert_eq!(BufferSize::new(300, 150).aspect(), 2.0);
        assert_eq!(BufferSize::new(300, 0).aspect(), 300.0);
    }

    #[test]
    fn device_limits_never_empty() {
        assert_eq!(DeviceLimits::new(0).max_dimension(), 1);
        assert_eq!(DeviceLimits::default().max_dimension(), 8192);
    }

    #[test]
    fn device_limits_serde_field_name() {
        let json = serde_json::to_string(&DeviceLimits::new(4096)).unwrap();
        assert_eq!(json, r#"{"max_texture_dimension_2d":4096}"#);
    }
}
