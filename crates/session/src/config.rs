use std::path::Path;
use std::time::Duration;

use blockfield_common::DEFAULT_SEED;
use blockfield_heightmap::GeneratorParams;
use blockfield_layout::PlaneParams;
use blockfield_render::{HemisphereLight, RenderView};
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a session config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to start a session. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for every random draw in the session.
    pub seed: u64,
    /// Milliseconds between raster regenerations.
    pub regen_period_ms: u64,
    /// Generate and publish a raster immediately when the session mounts.
    pub generate_on_mount: bool,
    pub heightmap: GeneratorParams,
    pub plane: PlaneParams,
    pub view: RenderView,
    pub lighting: HemisphereLight,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            regen_period_ms: 500,
            generate_on_mount: true,
            heightmap: GeneratorParams::default(),
            plane: PlaneParams::default(),
            view: RenderView::default(),
            lighting: HemisphereLight::default(),
        }
    }
}

impl SessionConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn regen_period(&self) -> Duration {
        Duration::from_millis(self.regen_period_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regen_period_ms == 0 {
            return Err(ConfigError::Invalid("regen_period_ms must be positive".into()));
        }
        if self.plane.segments == 0 {
            return Err(ConfigError::Invalid("plane.segments must be positive".into()));
        }
        if self.plane.size.is_nan() || self.plane.size <= 0.0 {
            return Err(ConfigError::Invalid("plane.size must be positive".into()));
        }
        if self.heightmap.stamps == 0 {
            return Err(ConfigError::Invalid("heightmap.stamps must be positive".into()));
        }
        let (inner, outer) = (self.heightmap.inner_radius, self.heightmap.outer_radius);
        if inner.is_nan() || outer.is_nan() || outer <= inner {
            return Err(ConfigError::Invalid(
                "heightmap.outer_radius must exceed inner_radius".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.regen_period(), Duration::from_millis(500));
        assert_eq!(config.plane.segments, 100);
        assert_eq!(config.heightmap.stamps, 100);
    }

    #[test]
    fn load_partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 7, "regen_period_ms": 250 }}"#).unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.regen_period_ms, 250);
        assert_eq!(config.plane, PlaneParams::default());
        assert!(config.generate_on_mount);
    }

    #[test]
    fn load_nested_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "heightmap": {{ "stamps": 10 }}, "plane": {{ "segments": 4 }} }}"#
        )
        .unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.heightmap.stamps, 10);
        assert_eq!(config.heightmap.outer_radius, 50.0);
        assert_eq!(config.plane.segments, 4);
        assert_eq!(config.plane.size, 20.0);
    }

    #[test]
    fn zero_period_rejected() {
        let config = SessionConfig {
            regen_period_ms: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_radii_rejected() {
        let mut config = SessionConfig::default();
        config.heightmap.inner_radius = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SessionConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = SessionConfig {
            seed: 99,
            ..SessionConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
