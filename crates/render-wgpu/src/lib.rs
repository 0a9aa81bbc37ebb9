//! wgpu render backend for canvasfit.
//!
//! Renders one unlit, rotating cube and exposes a wgpu surface as a
//! `RenderTarget`, so the resolver can size its swapchain.
//!
//! # Invariants
//! - The surface is only reconfigured when the resolved size changes.
//! - Depth and multisample attachments always match the surface size.
//! - Nothing here touches the window's presentation size.

mod camera;
mod gpu;
mod shaders;
mod target;

pub use camera::PerspectiveCamera;
pub use gpu::{CUBE_COLOR, CubeRenderer, supported_sample_count};
pub use target::{SurfaceTarget, device_limits};
