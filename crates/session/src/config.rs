use arplace_assets::NormalizeConfig;
use arplace_common::GroundPlane;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from reading or writing a session config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for a placement session. Every field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub normalize: NormalizeConfig,
    /// Uniform scale stamped on every placed entity.
    pub entity_scale: f32,
    /// Virtual ground used in simulation mode.
    pub ground: GroundPlane,
    /// Frames a transient status stays up (about two seconds at 60 fps).
    pub status_hold_frames: u32,
    /// Seed for entity orientations. Entropy when absent.
    pub seed: Option<u64>,
    /// Environment variable holding the scene-description credential.
    pub describe_key_env: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeConfig::default(),
            entity_scale: 1.0,
            ground: GroundPlane::default(),
            status_hold_frames: 120,
            seed: None,
            describe_key_env: "API_KEY".into(),
        }
    }
}

impl SessionConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save the config to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = SessionConfig::default();
        assert_eq!(c.normalize.target_size, 0.5);
        assert_eq!(c.normalize.fbx_prescale, 0.01);
        assert_eq!(c.entity_scale, 1.0);
        assert_eq!(c.ground.height, 0.0);
        assert_eq!(c.status_hold_frames, 120);
        assert!(c.seed.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"seed": 42, "normalize": {{"target_size": 1.0}}}}"#).unwrap();
        let c = SessionConfig::load(tmp.path()).unwrap();
        assert_eq!(c.seed, Some(42));
        assert_eq!(c.normalize.target_size, 1.0);
        assert_eq!(c.normalize.fbx_prescale, 0.01);
        assert_eq!(c.status_hold_frames, 120);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let c = SessionConfig {
            entity_scale: 2.0,
            seed: Some(9),
            ..SessionConfig::default()
        };
        c.save(tmp.path()).unwrap();
        assert_eq!(SessionConfig::load(tmp.path()).unwrap(), c);
    }

    #[test]
    fn malformed_file_is_json_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();
        assert!(matches!(
            SessionConfig::load(tmp.path()),
            Err(ConfigError::Json(_))
        ));
    }
}
