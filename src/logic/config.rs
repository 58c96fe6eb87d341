//! Engine Configuration
//!
//! Explicit configuration value handed to every component at construction.
//! Nothing in the scoring path reads the environment on its own.

use std::path::{Path, PathBuf};

use crate::constants;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the persisted model/scaler/metrics artifacts
    pub model_dir: PathBuf,

    /// Below this many real samples, training switches to synthetic data
    pub min_training_samples: usize,

    /// Seed for synthetic data and model fitting
    pub random_seed: u64,

    /// Kill-switch for the model path (rule-based / fallback only when false)
    pub ml_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: constants::default_model_dir(),
            min_training_samples: constants::DEFAULT_MIN_TRAINING_SAMPLES,
            random_seed: constants::DEFAULT_RANDOM_SEED,
            ml_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_dir: constants::get_model_dir(),
            min_training_samples: constants::get_min_training_samples(),
            random_seed: constants::get_random_seed(),
            ml_enabled: std::env::var("ML_ENABLED")
                .map(|s| s.to_lowercase() != "false" && s != "0")
                .unwrap_or(true),
        }
    }

    /// Defaults with an explicit model directory (tests, embedding)
    pub fn with_model_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_model_dir_keeps_defaults() {
        let config = EngineConfig::with_model_dir("/tmp/models");
        assert_eq!(config.model_dir(), Path::new("/tmp/models"));
        assert_eq!(config.min_training_samples, 100);
        assert_eq!(config.random_seed, 42);
        assert!(config.ml_enabled);
    }
}
