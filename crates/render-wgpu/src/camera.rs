use canvasfit_common::LayoutSize;
use glam::{Mat4, Vec3};

/// Fixed perspective camera looking at the origin.
///
/// Only the aspect ratio changes at runtime. It follows the surface's layout
/// size, not the drawing buffer, so a clamped buffer stretched over the
/// surface still shows an undistorted image.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::ZERO,
            fov: 75.0_f32.to_radians(),
            aspect: 2.0,
            near: 0.1,
            far: 5.0,
        }
    }
}

impl PerspectiveCamera {
    /// Set the aspect ratio from the surface's layout size. Empty or
    /// non-finite sizes keep the previous aspect.
    pub fn set_viewport(&mut self, layout: LayoutSize) {
        let aspect = layout.width / layout.height;
        if layout.height > 0.0 && aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
