//! Engine - one entry point over the three scorers
//!
//! Holds the configuration and the shared `ModelManager`; every call is
//! synchronous and CPU-bound. Cloning is cheap (the manager is shared).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::anomaly::detect_anomaly;
use crate::logic::config::EngineConfig;
use crate::logic::error::TrainingError;
use crate::logic::lifecycle::{LoadedModel, ModelFamily, ModelInfo, ModelManager};
use crate::logic::risk::{analyze_feature_importance, score_risk, ImportanceReport, RiskResult};
use crate::logic::scan::ScanData;
use crate::logic::threat::{classify_threat, ThreatResult};
use crate::logic::training::{LabeledScan, TrainOptions};

/// Merged result of the three scorers for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAssessment {
    pub risk: RiskResult,
    pub threat: ThreatResult,
    pub anomalous: bool,
}

#[derive(Debug, Clone)]
pub struct Engine {
    models: Arc<ModelManager>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        log::info!("Model directory: {:?}", config.model_dir());
        Self {
            models: Arc::new(ModelManager::new(config)),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    pub fn config(&self) -> &EngineConfig {
        self.models.config()
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    pub fn score_risk(&self, scan: &ScanData) -> RiskResult {
        score_risk(scan, &self.models)
    }

    pub fn classify_threat(&self, scan: &ScanData) -> ThreatResult {
        classify_threat(scan, &self.models)
    }

    pub fn detect_anomaly(&self, scan: &ScanData) -> bool {
        detect_anomaly(scan, &self.models)
    }

    pub fn assess(&self, scan: &ScanData) -> SiteAssessment {
        let assessment = SiteAssessment {
            risk: self.score_risk(scan),
            threat: self.classify_threat(scan),
            anomalous: self.detect_anomaly(scan),
        };
        log::info!(
            "Assessment: risk {:.1} ({}), threat {} (detected={}), anomalous={}",
            assessment.risk.overall_score,
            assessment.risk.risk_level,
            assessment.threat.primary_threat_type,
            assessment.threat.threat_detected,
            assessment.anomalous
        );
        assessment
    }

    // ------------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------------

    /// Importance report for the risk regressor (trained first if absent)
    pub fn feature_importance(&self) -> Result<ImportanceReport, TrainingError> {
        match self.models.load_model(ModelFamily::Risk)? {
            LoadedModel::Risk(trained) => Ok(analyze_feature_importance(&trained.model)),
            other => Err(TrainingError::Degenerate(format!(
                "expected a risk model, got {}",
                other.family()
            ))),
        }
    }

    /// Train one family with default hyperparameters
    pub fn train(
        &self,
        family: ModelFamily,
        data: Option<&[LabeledScan]>,
        tune: bool,
        save: bool,
    ) -> Result<LoadedModel, TrainingError> {
        Ok(match family {
            ModelFamily::Risk => LoadedModel::Risk(self.models.train_risk(data, &options(tune, save))?),
            ModelFamily::Threat => LoadedModel::Threat(self.models.train_threat(data, &options(tune, save))?),
            ModelFamily::Anomaly => {
                LoadedModel::Anomaly(self.models.train_anomaly(data, &options(tune, save))?)
            }
        })
    }

    pub fn model_info(&self) -> Vec<ModelInfo> {
        ModelFamily::ALL
            .into_iter()
            .map(|family| self.models.model_info(family))
            .collect()
    }
}

fn options<P: Default>(tune: bool, save: bool) -> TrainOptions<P> {
    TrainOptions {
        tune,
        save,
        ..Default::default()
    }
}
