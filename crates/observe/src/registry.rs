use canvasfit_common::{LayoutSize, SurfaceId};
use std::collections::BTreeMap;

/// Action run after each observed-size update of one surface.
pub type SizeChangeCallback = Box<dyn FnMut()>;

/// Content-box extents as reported by the layout engine.
///
/// Inline maps to width and block maps to height (horizontal writing mode).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    pub inline_size: f64,
    pub block_size: f64,
}

impl From<BoxSize> for LayoutSize {
    fn from(b: BoxSize) -> Self {
        LayoutSize::new(b.inline_size, b.block_size)
    }
}

/// One entry of a layout-change notification batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    pub target: SurfaceId,
    pub content_box_size: BoxSize,
}

impl ResizeEntry {
    pub fn new(target: SurfaceId, width: f64, height: f64) -> Self {
        Self {
            target,
            content_box_size: BoxSize {
                inline_size: width,
                block_size: height,
            },
        }
    }
}

/// Counters for instrumentation and the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverStats {
    pub batches: u64,
    pub entries_applied: u64,
    pub entries_ignored: u64,
    pub callbacks_invoked: u64,
}

#[derive(Default)]
struct Observation {
    observed: Option<LayoutSize>,
    callback: Option<SizeChangeCallback>,
}

/// Registry of observed surfaces.
///
/// Single-threaded: the only mutator is the notification handler, which runs
/// on the same thread as every reader.
#[derive(Default)]
pub struct SizeObserverRegistry {
    surfaces: BTreeMap<SurfaceId, Observation>,
    stats: ObserverStats,
}

impl std::fmt::Debug for SizeObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeObserverRegistry")
            .field("surfaces", &self.surfaces.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl SizeObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin observing `id` with no callback.
    ///
    /// Any callback registered earlier for the same surface is dropped.
    pub fn register(&mut self, id: SurfaceId) {
        self.install(id, None);
    }

    /// Begin observing `id` and run `callback` after each of its updates.
    pub fn register_with_callback(&mut self, id: SurfaceId, callback: impl FnMut() + 'static) {
        self.install(id, Some(Box::new(callback)));
    }

    fn install(&mut self, id: SurfaceId, callback: Option<SizeChangeCallback>) {
        let existed = self.surfaces.contains_key(&id);
        let has_callback = callback.is_some();
        // An existing observation keeps its recorded size.
        self.surfaces.entry(id).or_default().callback = callback;
        tracing::debug!(
            surface = %id.short(),
            reregistered = existed,
            has_callback,
            "surface registered"
        );
    }

    /// Stop observing `id`. Returns whether it was registered.
    pub fn unregister(&mut self, id: SurfaceId) -> bool {
        let removed = self.surfaces.remove(&id).is_some();
        if removed {
            tracing::debug!(surface = %id.short(), "surface unregistered");
        }
        removed
    }

    /// Apply one notification batch from the layout engine.
    ///
    /// Entries are processed in iteration order: the size is recorded, then the
    /// surface's callback runs. Returns how many entries were applied.
    pub fn notify<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = ResizeEntry>,
    {
        self.stats.batches += 1;
        let mut applied = 0;
        for entry in entries {
            let Some(observation) = self.surfaces.get_mut(&entry.target) else {
                self.stats.entries_ignored += 1;
                tracing::trace!(surface = %entry.target.short(), "notification for unobserved surface");
                continue;
            };
            let size = LayoutSize::from(entry.content_box_size);
            observation.observed = Some(size);
            applied += 1;
            self.stats.entries_applied += 1;
            tracing::trace!(
                surface = %entry.target.short(),
                width = size.width,
                height = size.height,
                "observed size updated"
            );
            if let Some(callback) = observation.callback.as_mut() {
                callback();
                self.stats.callbacks_invoked += 1;
            }
        }
        applied
    }

    /// Latest observed size, or `None` if nothing was observed yet.
    pub fn observed_size(&self, id: SurfaceId) -> Option<LayoutSize> {
        self.surfaces.get(&id).and_then(|o| o.observed)
    }

    pub fn is_registered(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Registered surfaces in deterministic order.
    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn stats(&self) -> ObserverStats {
        self.stats
    }

    /// End of the registry's lifecycle. Drops every observation and callback.
    pub fn teardown(self) {
        if self.surfaces.is_empty() {
            tracing::debug!("observer registry torn down");
        } else {
            tracing::info!(
                still_registered = self.surfaces.len(),
                "observer registry torn down with surfaces still registered"
            );
        }
    }
}
