//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value here can be overridden from the environment (or `.env`).

use std::path::PathBuf;

/// Directory name under the platform data dir
pub const APP_DIR_NAME: &str = "site-analyser";

/// Sub-directory holding persisted model artifacts
pub const MODEL_DIR_NAME: &str = "models";

/// Minimum number of real samples before training skips synthetic data
pub const DEFAULT_MIN_TRAINING_SAMPLES: usize = 100;

/// Seed shared by every synthetic generator and model fit
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Site-Analyser";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default model directory: `<data_local_dir>/site-analyser/models`, or `./models`
pub fn default_model_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME).join(MODEL_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(MODEL_DIR_NAME))
}

/// Get model directory from environment or use default
pub fn get_model_dir() -> PathBuf {
    std::env::var("MODEL_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_model_dir)
}

/// Get minimum real-sample count from environment or use default
pub fn get_min_training_samples() -> usize {
    std::env::var("MIN_TRAINING_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MIN_TRAINING_SAMPLES)
}

/// Get random seed from environment or use default
pub fn get_random_seed() -> u64 {
    std::env::var("RANDOM_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RANDOM_SEED)
}
