//! Developer Tooling: surface inspector and scripted notification replay.
//!
//! # Invariants
//! - Tools only read the registry, except `replay`, which owns its own.

pub mod inspector;
pub mod replay;

pub use inspector::{SurfaceInspector, SurfaceSummary};
pub use replay::{FrameReport, ReplayError, ReplayReport, ReplayScript};

pub fn crate_info() -> &'static str {
    concat!("canvasfit-tools v", env!("CARGO_PKG_VERSION"))
}
