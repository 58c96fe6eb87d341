//! Site Analyser Core - risk scoring, threat classification and anomaly
//! detection for website security scans.
//!
//! ```ignore
//! use site_analyser_core::{Engine, EngineConfig, ScanData};
//!
//! let engine = Engine::new(EngineConfig::from_env());
//! let scan = ScanData::from_value(json)?;
//! let assessment = engine.assess(&scan);
//! ```

pub mod constants;
pub mod logic;

pub use logic::config::EngineConfig;
pub use logic::engine::{Engine, SiteAssessment};
pub use logic::error::{ModelError, StorageError, TrainingError};
pub use logic::features::{extract_anomaly_features, extract_risk_features, extract_threat_features, FeatureVector};
pub use logic::lifecycle::{LoadedModel, ModelFamily, ModelInfo, ModelManager, ModelState};
pub use logic::risk::{score_risk, RiskResult};
pub use logic::scan::ScanData;
pub use logic::threat::{classify_threat, ThreatResult};
pub use logic::anomaly::detect_anomaly;
pub use logic::training::{train_anomaly_model, train_risk_model, train_threat_model, LabeledScan, TrainedModel};
