//! Size Resolver: turns observed layout sizes into drawing-buffer sizes.
//!
//! # Invariants
//! - Every resolved dimension lies in `[1, DeviceLimits::max_dimension()]`.
//! - Resolution is a pure read of the registry; it never mutates it.
//! - Applying a size only changes a target's backing buffer, never how the
//!   surface is presented.
//!
//! The `Surface` and `RenderTarget` traits are the seams to the platform and
//! rendering backend. `StaticSurface` and `BufferTarget` are headless
//! implementations for tools and tests.

mod resolver;
mod target;

pub use resolver::{
    DEFAULT_MULTIPLIER, apply_resize_to_surface, clamp_dimension, layout_size, resolve_size,
};
pub use target::{BufferTarget, RenderTarget, StaticSurface, Surface};
