use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating the demo configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Demo settings. Every field has a default, so a config file only needs the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub title: String,
    /// Initial inner size of the window, in logical pixels.
    pub width: u32,
    pub height: u32,
    /// Fixed layout-to-buffer multiplier. `None` follows the window's scale
    /// factor.
    pub multiplier: Option<f64>,
    /// Lower the device's max texture dimension to this value.
    pub max_texture_dimension_2d: Option<u32>,
    pub msaa_samples: u32,
    pub vsync: bool,
    pub show_overlay: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "canvasfit".into(),
            width: 800,
            height: 600,
            multiplier: None,
            max_texture_dimension_2d: None,
            msaa_samples: 4,
            vsync: true,
            show_overlay: true,
        }
    }
}

impl DemoConfig {
    /// Load a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(m) = self.multiplier {
            if !m.is_finite() || m <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "multiplier must be a positive number, got {m}"
                )));
            }
        }
        if self.max_texture_dimension_2d == Some(0) {
            return Err(ConfigError::Invalid(
                "max_texture_dimension_2d must be at least 1".into(),
            ));
        }
        if !matches!(self.msaa_samples, 1 | 2 | 4 | 8) {
            return Err(ConfigError::Invalid(format!(
                "msaa_samples must be 1, 2, 4 or 8, got {}",
                self.msaa_samples
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = DemoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.multiplier, None);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "multiplier: 2.0\nmax_texture_dimension_2d: 4096").unwrap();

        let config = DemoConfig::load(tmp.path()).unwrap();
        assert_eq!(config.multiplier, Some(2.0));
        assert_eq!(config.max_texture_dimension_2d, Some(4096));
        assert_eq!(config.width, 800);
        assert!(config.vsync);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            DemoConfig {
                width: 0,
                ..DemoConfig::default()
            },
            DemoConfig {
                multiplier: Some(-1.0),
                ..DemoConfig::default()
            },
            DemoConfig {
                multiplier: Some(f64::NAN),
                ..DemoConfig::default()
            },
            DemoConfig {
                max_texture_dimension_2d: Some(0),
                ..DemoConfig::default()
            },
            DemoConfig {
                msaa_samples: 3,
                ..DemoConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "width: [not, a, number]").unwrap();
        assert!(matches!(
            DemoConfig::load(tmp.path()),
            Err(ConfigError::Yaml(_))
        ));
    }
}
