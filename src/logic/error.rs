//! Error taxonomy for the scoring core.
//!
//! - `StorageError`: artifact I/O, corruption, version/layout mismatch
//! - `ModelError`: anything on the model path (caught by the scorers, never surfaced)
//! - `TrainingError`: fatal, propagated to the caller

use std::path::PathBuf;

use crate::logic::features::LayoutMismatchError;
use crate::logic::lifecycle::ModelFamily;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Incomplete artifact set for {family}: missing {missing:?}")]
    Incomplete {
        family: ModelFamily,
        missing: Vec<PathBuf>,
    },

    #[error("Checksum mismatch in {path:?}: expected {expected}, got {actual}")]
    Checksum {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Artifacts for {family} come from different training runs")]
    RunMismatch { family: ModelFamily },

    #[error("Unsupported artifact format v{found} (expected v{expected})")]
    FormatVersion { found: u32, expected: u32 },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("Artifact {path:?} belongs to {found}, expected {expected}")]
    FamilyMismatch {
        path: PathBuf,
        expected: ModelFamily,
        found: ModelFamily,
    },
}

impl StorageError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(source: serde_json::Error, path: impl Into<PathBuf>) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("No persisted {0} model")]
    Absent(ModelFamily),

    #[error("{0} used before fit")]
    NotFitted(&'static str),

    #[error("Feature shape mismatch: model expects {expected}, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Model disabled by configuration")]
    Disabled,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Insufficient training data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Degenerate training data: {0}")]
    Degenerate(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
