//! Size Observer Registry: per-surface observed layout size and change callback.
//!
//! # Invariants
//! - At most one callback per surface; registering again replaces it.
//! - Registering twice never creates a second observation.
//! - Updates for one surface are applied in the order they are delivered.
//! - Notifications for surfaces that are not registered are dropped.
//!
//! The registry is an explicit object owned by the application. It holds
//! non-owning associations keyed by `SurfaceId`; the owner of a surface must
//! call `unregister` when the surface goes away, otherwise the entry lives
//! until `teardown`.

mod registry;

pub use registry::{BoxSize, ObserverStats, ResizeEntry, SizeChangeCallback, SizeObserverRegistry};
