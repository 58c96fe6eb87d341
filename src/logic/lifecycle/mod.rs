//! Lifecycle Module - train / persist / load for the three model families
//!
//! Per family: `Absent → Training → Persisted → Loaded`. Nothing ever moves a
//! family back to `Absent`; a retrain supersedes the stored artifacts.
//!
//! ## Structure
//! - `storage`: versioned, checksummed artifact envelopes on disk
//! - `manager`: `ModelManager` (in-memory cache, train-on-miss, state)

pub mod manager;
pub mod storage;


use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureDomain;

pub use manager::{LoadedModel, ModelInfo, ModelManager};
pub use storage::{ArtifactHeader, ArtifactKind, ArtifactPaths, ArtifactStore, ARTIFACT_FORMAT_VERSION};

// ============================================================================
// MODEL FAMILY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Risk,
    Threat,
    Anomaly,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [ModelFamily::Risk, ModelFamily::Threat, ModelFamily::Anomaly];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Risk => "risk",
            ModelFamily::Threat => "threat",
            ModelFamily::Anomaly => "anomaly",
        }
    }

    /// Feature layout the family's models consume
    pub fn domain(&self) -> FeatureDomain {
        match self {
            ModelFamily::Risk => FeatureDomain::Risk,
            ModelFamily::Threat => FeatureDomain::Threat,
            ModelFamily::Anomaly => FeatureDomain::Anomaly,
        }
    }

    pub fn model_type(&self) -> &'static str {
        match self {
            ModelFamily::Risk => "GradientBoostingRegressor",
            ModelFamily::Threat => "RandomForestClassifier",
            ModelFamily::Anomaly => "IsolationForest",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown model family '{s}' (expected risk, threat or anomaly)"))
    }
}

// ============================================================================
// MODEL STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// No artifacts on disk, nothing cached
    Absent,
    /// A training run is in progress in this process
    Training,
    /// Complete artifact set on disk, not yet loaded
    Persisted,
    /// Cached in memory
    Loaded,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelState::Absent => "absent",
            ModelState::Training => "training",
            ModelState::Persisted => "persisted",
            ModelState::Loaded => "loaded",
        }
    }
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FAMILY MODEL TRAIT
// ============================================================================

/// A persistable estimator belonging to one model family
pub trait FamilyModel: Serialize + DeserializeOwned + Send + Sync + 'static {
    const FAMILY: ModelFamily;

    /// Evaluation record stored next to the model
    type Metrics: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static;

    fn n_features(&self) -> usize;
}
