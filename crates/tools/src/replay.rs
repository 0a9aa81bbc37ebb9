//! Scripted replay of layout notifications.
//!
//! A script names a set of surfaces and a sequence of frames. Each frame
//! delivers one notification batch, then every surface is resolved, the same
//! way an application polls once per animation frame.
//!
//! ```yaml
//! max_texture_dimension_2d: 4096
//! multiplier: 1.0
//! surfaces:
//!   - { name: main, width: 300, height: 150, callback: true }
//! frames:
//!   - notifications:
//!       - { surface: main, width: 8000, height: 500 }
//!   - unregister: [main]
//! ```

use canvasfit_common::{BufferSize, DeviceLimits};
use canvasfit_observe::{ResizeEntry, SizeObserverRegistry};
use canvasfit_resolve::{DEFAULT_MULTIPLIER, StaticSurface, resolve_size};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

/// Errors from loading or running a replay script.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frame {frame}: unknown surface `{name}`")]
    UnknownSurface { frame: usize, name: String },
    #[error("surface `{0}` declared twice")]
    DuplicateSurface(String),
}

/// A surface declared by a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceScript {
    pub name: String,
    /// Intrinsic width, used until the first notification.
    pub width: f64,
    pub height: f64,
    /// Register with a callback that counts invocations.
    #[serde(default)]
    pub callback: bool,
}

/// One layout-change notification entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationScript {
    pub surface: String,
    pub width: f64,
    pub height: f64,
}

/// What happens in one frame, in order: unregistrations, then the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameScript {
    #[serde(default)]
    pub unregister: Vec<String>,
    #[serde(default)]
    pub notifications: Vec<NotificationScript>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_max_dimension")]
    pub max_texture_dimension_2d: u32,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    pub surfaces: Vec<SurfaceScript>,
    #[serde(default)]
    pub frames: Vec<FrameScript>,
}

fn default_max_dimension() -> u32 {
    DeviceLimits::DEFAULT_MAX_TEXTURE_DIMENSION_2D
}

fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}

/// Resolved sizes after one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub applied: usize,
    pub sizes: BTreeMap<String, BufferSize>,
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub limits: DeviceLimits,
    pub multiplier: f64,
    pub frames: Vec<FrameReport>,
    /// Callback invocations per surface registered with `callback: true`.
    pub callbacks: BTreeMap<String, u32>,
}

impl ReplayScript {
    /// Load a script from disk. `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let script = if is_yaml {
            serde_yaml::from_str(&data)?
        } else {
            serde_json::from_str(&data)?
        };
        Ok(script)
    }

    pub fn limits(&self) -> DeviceLimits {
        DeviceLimits::new(self.max_texture_dimension_2d)
    }

    /// Drive a fresh registry through every frame.
    pub fn run(&self) -> Result<ReplayReport, ReplayError> {
        let limits = self.limits();
        let mut registry = SizeObserverRegistry::new();
        let mut surfaces: BTreeMap<String, StaticSurface> = BTreeMap::new();
        let mut counters: BTreeMap<String, Rc<Cell<u32>>> = BTreeMap::new();

        for decl in &self.surfaces {
            if surfaces.contains_key(&decl.name) {
                return Err(ReplayError::DuplicateSurface(decl.name.clone()));
            }
            let surface = StaticSurface::new(decl.width, decl.height);
            if decl.callback {
                let count = Rc::new(Cell::new(0));
                let handle = count.clone();
                registry.register_with_callback(surface.id, move || handle.set(handle.get() + 1));
                counters.insert(decl.name.clone(), count);
            } else {
                registry.register(surface.id);
            }
            surfaces.insert(decl.name.clone(), surface);
        }

        let lookup = |frame: usize, name: &str| {
            surfaces
                .get(name)
                .copied()
                .ok_or_else(|| ReplayError::UnknownSurface {
                    frame,
                    name: name.to_string(),
                })
        };

        let mut frames = Vec::with_capacity(self.frames.len());
        for (index, frame) in self.frames.iter().enumerate() {
            for name in &frame.unregister {
                registry.unregister(lookup(index, name)?.id);
            }

            let batch = frame
                .notifications
                .iter()
                .map(|n| -> Result<ResizeEntry, ReplayError> {
                    let surface = lookup(index, &n.surface)?;
                    Ok(ResizeEntry::new(surface.id, n.width, n.height))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let applied = registry.notify(batch);

            let sizes = surfaces
                .iter()
                .map(|(name, surface)| {
                    (
                        name.clone(),
                        resolve_size(&registry, surface, limits, self.multiplier),
                    )
                })
                .collect();
            tracing::debug!(frame = index, applied, "replayed frame");
            frames.push(FrameReport {
                frame: index,
                applied,
                sizes,
            });
        }

        registry.teardown();

        Ok(ReplayReport {
            limits,
            multiplier: self.multiplier,
            frames,
            callbacks: counters
                .into_iter()
                .map(|(name, count)| (name, count.get()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCRIPT: &str = r#"
max_texture_dimension_2d: 4096
surfaces:
  - { name: main, width: 300, height: 150, callback: true }
  - { name: side, width: 0, height: 0 }
frames:
  - notifications: []
  - notifications:
      - { surface: main, width: 8000, height: 500 }
  - notifications:
      - { surface: main, width: 800, height: 600 }
      - { surface: side, width: 120, height: 90 }
  - unregister: [main]
    notifications:
      - { surface: main, width: 10, height: 10 }
"#;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        tmp.write_all(body.as_bytes()).unwrap();
        tmp
    }

    #[test]
    fn replay_yaml_script() {
        let tmp = write_temp(".yaml", SCRIPT);
        let script = ReplayScript::load(tmp.path()).unwrap();
        assert_eq!(script.multiplier, 1.0);

        let report = script.run().unwrap();
        assert_eq!(report.frames.len(), 4);

        let sizes = |i: usize, name: &str| report.frames[i].sizes[name];
        assert_eq!(sizes(0, "main"), BufferSize::new(300, 150));
        assert_eq!(sizes(0, "side"), BufferSize::new(1, 1));
        assert_eq!(sizes(1, "main"), BufferSize::new(4096, 500));
        assert_eq!(sizes(2, "main"), BufferSize::new(800, 600));
        assert_eq!(sizes(2, "side"), BufferSize::new(120, 90));
        // Unregistered: back to intrinsic size, and the notification is dropped.
        assert_eq!(report.frames[3].applied, 0);
        assert_eq!(sizes(3, "main"), BufferSize::new(300, 150));

        assert_eq!(report.callbacks["main"], 2);
        assert!(!report.callbacks.contains_key("side"));
    }

    #[test]
    fn replay_json_script_with_multiplier() {
        let tmp = write_temp(
            ".json",
            r#"{
                "multiplier": 2.0,
                "surfaces": [{ "name": "c", "width": 10, "height": 10 }],
                "frames": [{ "notifications": [{ "surface": "c", "width": 800, "height": 600 }] }]
            }"#,
        );
        let report = ReplayScript::load(tmp.path()).unwrap().run().unwrap();
        assert_eq!(report.limits, DeviceLimits::default());
        assert_eq!(report.frames[0].sizes["c"], BufferSize::new(1600, 1200));
    }

    #[test]
    fn unknown_surface_is_an_error() {
        let script: ReplayScript = serde_yaml::from_str(
            "surfaces: []\nframes:\n  - notifications:\n      - { surface: ghost, width: 1, height: 1 }\n",
        )
        .unwrap();
        let err = script.run().unwrap_err();
        assert!(matches!(err, ReplayError::UnknownSurface { frame: 0, .. }));
    }

    #[test]
    fn duplicate_surface_is_an_error() {
        let script: ReplayScript = serde_yaml::from_str(
            "surfaces:\n  - { name: a, width: 1, height: 1 }\n  - { name: a, width: 2, height: 2 }\n",
        )
        .unwrap();
        assert!(matches!(
            script.run(),
            Err(ReplayError::DuplicateSurface(name)) if name == "a"
        ));
    }

    #[test]
    fn report_serializes_to_json() {
        let script: ReplayScript = serde_yaml::from_str(SCRIPT).unwrap();
        let report = script.run().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"][1]["sizes"]["main"]["width"], 4096);
    }
}
