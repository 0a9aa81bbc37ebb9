//! Shared types for the canvasfit workspace.
//!
//! # Invariants
//! - A `SurfaceId` is stable for the lifetime of the surface it names.
//! - A `BufferSize` is always integral; a `LayoutSize` may be anything the
//!   layout engine reports, including zero or non-finite values.

mod types;

pub use types::{BufferSize, DeviceLimits, LayoutSize, SurfaceId};
