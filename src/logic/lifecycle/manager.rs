//! Model Manager
//!
//! Owns the in-memory cache for the three families and moves each family
//! through `Absent → Training → Persisted → Loaded`.
//!
//! Two access paths:
//! - `risk_model` / `threat_model` / `anomaly_model`: cache, then disk. Never trains.
//!   Scorers use these and fall back to rules on `Err`.
//! - `load_model` / `anomaly_for_detection`: train on miss or corruption,
//!   persist, cache. One training run per family at a time in this process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;
use crate::logic::error::{ModelError, TrainingError};
use crate::logic::model::{
    GradientBoostingParams, GradientBoostingRegressor, IsolationForest, IsolationForestParams,
    RandomForestClassifier, RandomForestParams,
};
use crate::logic::training::{
    bootstrap_anomaly_model, train_anomaly_model, train_risk_model, train_threat_model, LabeledScan,
    TrainOptions, TrainedModel,
};

use super::storage::ArtifactStore;
use super::{FamilyModel, ModelFamily, ModelState};

// ============================================================================
// SLOT
// ============================================================================

/// Cache cell + single-flight guard for one family
struct Slot<M: FamilyModel> {
    cached: RwLock<Option<Arc<TrainedModel<M>>>>,
    flight: Mutex<()>,
    training: AtomicBool,
}

impl<M: FamilyModel> Default for Slot<M> {
    fn default() -> Self {
        Self {
            cached: RwLock::new(None),
            flight: Mutex::new(()),
            training: AtomicBool::new(false),
        }
    }
}

impl<M: FamilyModel> Slot<M> {
    fn get(&self) -> Option<Arc<TrainedModel<M>>> {
        self.cached.read().clone()
    }

    fn install(&self, trained: TrainedModel<M>) -> Arc<TrainedModel<M>> {
        let trained = Arc::new(trained);
        *self.cached.write() = Some(Arc::clone(&trained));
        trained
    }

    fn run_training(
        &self,
        train: impl FnOnce() -> Result<TrainedModel<M>, TrainingError>,
    ) -> Result<TrainedModel<M>, TrainingError> {
        self.training.store(true, Ordering::SeqCst);
        let result = train();
        self.training.store(false, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// PUBLIC TYPES
// ============================================================================

/// A cached model of any family
#[derive(Debug, Clone)]
pub enum LoadedModel {
    Risk(Arc<TrainedModel<GradientBoostingRegressor>>),
    Threat(Arc<TrainedModel<RandomForestClassifier>>),
    Anomaly(Arc<TrainedModel<IsolationForest>>),
}

impl LoadedModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            LoadedModel::Risk(_) => ModelFamily::Risk,
            LoadedModel::Threat(_) => ModelFamily::Threat,
            LoadedModel::Anomaly(_) => ModelFamily::Anomaly,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            LoadedModel::Risk(t) => t.model.n_features(),
            LoadedModel::Threat(t) => t.model.n_features(),
            LoadedModel::Anomaly(t) => t.model.n_features(),
        }
    }

    /// Metrics document as JSON
    pub fn metrics_json(&self) -> serde_json::Value {
        let value = match self {
            LoadedModel::Risk(t) => serde_json::to_value(&t.metrics),
            LoadedModel::Threat(t) => serde_json::to_value(&t.metrics),
            LoadedModel::Anomaly(t) => serde_json::to_value(&t.metrics),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub family: ModelFamily,
    pub model_type: String,
    pub feature_count: usize,
    /// Threat family only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    pub trained_at: Option<DateTime<Utc>>,
    pub is_available: bool,
    pub state: ModelState,
}

// ============================================================================
// MANAGER
// ============================================================================

pub struct ModelManager {
    config: EngineConfig,
    store: ArtifactStore,
    risk: Slot<GradientBoostingRegressor>,
    threat: Slot<RandomForestClassifier>,
    anomaly: Slot<IsolationForest>,
}

impl ModelManager {
    pub fn new(config: EngineConfig) -> Self {
        let store = ArtifactStore::from_config(&config);
        Self {
            config,
            store,
            risk: Slot::default(),
            threat: Slot::default(),
            anomaly: Slot::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    // ------------------------------------------------------------------------
    // No-train access
    // ------------------------------------------------------------------------

    fn cached_or_stored<M: FamilyModel>(&self, slot: &Slot<M>) -> Result<Arc<TrainedModel<M>>, ModelError> {
        if !self.config.ml_enabled {
            return Err(ModelError::Disabled);
        }
        if let Some(trained) = slot.get() {
            return Ok(trained);
        }
        if !self.store.exists(M::FAMILY) {
            return Err(ModelError::Absent(M::FAMILY));
        }
        let trained = self.store.load::<M>()?;
        Ok(slot.install(trained))
    }

    pub fn risk_model(&self) -> Result<Arc<TrainedModel<GradientBoostingRegressor>>, ModelError> {
        self.cached_or_stored(&self.risk)
    }

    pub fn threat_model(&self) -> Result<Arc<TrainedModel<RandomForestClassifier>>, ModelError> {
        self.cached_or_stored(&self.threat)
    }

    pub fn anomaly_model(&self) -> Result<Arc<TrainedModel<IsolationForest>>, ModelError> {
        self.cached_or_stored(&self.anomaly)
    }

    // ------------------------------------------------------------------------
    // Train-on-miss access
    // ------------------------------------------------------------------------

    fn get_or_train<M: FamilyModel>(
        &self,
        slot: &Slot<M>,
        train: impl FnOnce() -> Result<TrainedModel<M>, TrainingError>,
    ) -> Result<Arc<TrainedModel<M>>, TrainingError> {
        if let Some(trained) = slot.get() {
            return Ok(trained);
        }

        let _flight = slot.flight.lock();
        // Another caller may have finished while we waited
        if let Some(trained) = slot.get() {
            return Ok(trained);
        }

        let family = M::FAMILY;
        if self.store.exists(family) {
            match self.store.load::<M>() {
                Ok(trained) => return Ok(slot.install(trained)),
                Err(e) => log::error!("Error loading {} model: {}. Training new model", family, e),
            }
        } else {
            log::info!("{} model not found, training new model", family);
        }

        let trained = slot.run_training(train)?;
        Ok(slot.install(trained))
    }

    /// Cached, stored or freshly trained (with defaults, persisted) model
    pub fn load_model(&self, family: ModelFamily) -> Result<LoadedModel, TrainingError> {
        let config = &self.config;
        Ok(match family {
            ModelFamily::Risk => LoadedModel::Risk(self.get_or_train(&self.risk, || {
                train_risk_model(None, &TrainOptions::default(), config)
            })?),
            ModelFamily::Threat => LoadedModel::Threat(self.get_or_train(&self.threat, || {
                train_threat_model(None, &TrainOptions::default(), config)
            })?),
            ModelFamily::Anomaly => LoadedModel::Anomaly(self.get_or_train(&self.anomaly, || {
                train_anomaly_model(None, &TrainOptions::default(), config)
            })?),
        })
    }

    /// Detector for a live request: on a miss this bootstraps from random
    /// noise rather than the synthetic generator.
    pub fn anomaly_for_detection(&self) -> Result<Arc<TrainedModel<IsolationForest>>, ModelError> {
        if !self.config.ml_enabled {
            return Err(ModelError::Disabled);
        }
        let config = &self.config;
        Ok(self.get_or_train(&self.anomaly, || bootstrap_anomaly_model(config))?)
    }

    // ------------------------------------------------------------------------
    // Explicit training
    // ------------------------------------------------------------------------

    /// Train and cache when the run was persisted; an unsaved run leaves the
    /// cache alone so it keeps mirroring disk.
    fn retrain<M: FamilyModel>(
        &self,
        slot: &Slot<M>,
        save: bool,
        train: impl FnOnce() -> Result<TrainedModel<M>, TrainingError>,
    ) -> Result<Arc<TrainedModel<M>>, TrainingError> {
        let _flight = slot.flight.lock();
        let trained = slot.run_training(train)?;
        if save {
            Ok(slot.install(trained))
        } else {
            Ok(Arc::new(trained))
        }
    }

    pub fn train_risk(
        &self,
        data: Option<&[LabeledScan]>,
        options: &TrainOptions<GradientBoostingParams>,
    ) -> Result<Arc<TrainedModel<GradientBoostingRegressor>>, TrainingError> {
        self.retrain(&self.risk, options.save, || train_risk_model(data, options, &self.config))
    }

    pub fn train_threat(
        &self,
        data: Option<&[LabeledScan]>,
        options: &TrainOptions<RandomForestParams>,
    ) -> Result<Arc<TrainedModel<RandomForestClassifier>>, TrainingError> {
        self.retrain(&self.threat, options.save, || train_threat_model(data, options, &self.config))
    }

    pub fn train_anomaly(
        &self,
        data: Option<&[LabeledScan]>,
        options: &TrainOptions<IsolationForestParams>,
    ) -> Result<Arc<TrainedModel<IsolationForest>>, TrainingError> {
        self.retrain(&self.anomaly, options.save, || train_anomaly_model(data, options, &self.config))
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    fn slot_state<M: FamilyModel>(&self, slot: &Slot<M>) -> ModelState {
        if slot.training.load(Ordering::SeqCst) {
            ModelState::Training
        } else if slot.get().is_some() {
            ModelState::Loaded
        } else if self.store.exists(M::FAMILY) {
            ModelState::Persisted
        } else {
            ModelState::Absent
        }
    }

    pub fn state(&self, family: ModelFamily) -> ModelState {
        match family {
            ModelFamily::Risk => self.slot_state(&self.risk),
            ModelFamily::Threat => self.slot_state(&self.threat),
            ModelFamily::Anomaly => self.slot_state(&self.anomaly),
        }
    }

    /// Loads from disk if needed, never trains
    pub fn model_info(&self, family: ModelFamily) -> ModelInfo {
        let (feature_count, classes, trained_at) = match family {
            ModelFamily::Risk => match self.risk_model() {
                Ok(t) => (Some(t.model.n_features()), None, Some(t.metrics.training_date)),
                Err(_) => (None, None, None),
            },
            ModelFamily::Threat => match self.threat_model() {
                Ok(t) => (
                    Some(t.model.n_features()),
                    Some(t.model.classes.clone()),
                    Some(t.metrics.training_date),
                ),
                Err(_) => (None, None, None),
            },
            ModelFamily::Anomaly => match self.anomaly_model() {
                Ok(t) => (Some(t.model.n_features()), None, Some(t.metrics.training_date)),
                Err(_) => (None, None, None),
            },
        };

        ModelInfo {
            family,
            model_type: family.model_type().to_string(),
            feature_count: feature_count.unwrap_or_else(|| family.domain().count()),
            is_available: trained_at.is_some(),
            classes,
            trained_at,
            state: self.state(family),
        }
    }
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("model_dir", &self.store.dir())
            .field("risk", &self.state(ModelFamily::Risk))
            .field("threat", &self.state(ModelFamily::Threat))
            .field("anomaly", &self.state(ModelFamily::Anomaly))
            .finish()
    }
}
