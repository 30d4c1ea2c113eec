use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vah_core::VahError;

use crate::config::RunConfig;

/// Structured manifest describing a completed evolution run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Hash of the canonical JSON form of the configuration.
    pub config_hash: String,
    /// Accepted steps executed.
    pub steps: usize,
    /// Samples recorded into the time-series tables.
    pub samples: usize,
    /// Proper time reached, in fm.
    pub final_time: f64,
}

/// Hash of the canonical JSON form of a run configuration.
pub fn config_hash(config: &RunConfig) -> Result<String, VahError> {
    let json = serde_json::to_string(config).map_err(|err| VahError::Config {
        detail: format!("cannot canonicalize config: {err}"),
    })?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), VahError> {
        let output_error = |detail: String| VahError::Output {
            path: path.display().to_string(),
            detail,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| output_error(err.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| output_error(err.to_string()))?;
        fs::write(path, json).map_err(|err| output_error(err.to_string()))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<RunManifest, VahError> {
        let contents = fs::read_to_string(path).map_err(|err| VahError::Output {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| VahError::Output {
            path: path.display().to_string(),
            detail: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_through_disk() {
        let config = RunConfig::default();
        let manifest = RunManifest {
            config_hash: config_hash(&config).expect("hash"),
            config,
            steps: 19950,
            samples: 1996,
            final_time: 100.0,
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("manifest.json");
        manifest.write(&path).expect("write");
        let back = RunManifest::load(&path).expect("load");
        assert_eq!(manifest, back);
    }

    #[test]
    fn config_hash_is_stable_for_equal_configs() {
        let a = config_hash(&RunConfig::default()).expect("hash");
        let b = config_hash(&RunConfig::default()).expect("hash");
        assert_eq!(a, b);
    }
}
