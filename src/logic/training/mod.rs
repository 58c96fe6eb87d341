//! Training Module - fit, evaluate and (optionally) persist models
//!
//! Each family trains from labelled scans when enough are supplied, and from
//! a seeded synthetic generator otherwise. Every run yields a
//! `TrainedModel { model, scaler, metrics }`.
//!
//! ## Structure
//! - `dataset`: labelled scans, feature matrices, train/test splits
//! - `synthetic`: seeded generators per family
//! - `hyperparams`: training options and search grids
//! - `tuning`: k-fold grid search
//! - `risk`, `threat`, `anomaly`: one training pipeline per family

pub mod anomaly;
pub mod dataset;
pub mod hyperparams;
pub mod risk;
pub mod synthetic;
pub mod threat;
pub mod tuning;

#[cfg(test)]
mod tests;

use crate::logic::lifecycle::FamilyModel;
use crate::logic::model::StandardScaler;

pub use anomaly::{bootstrap_anomaly_model, train_anomaly_model, AnomalyEvaluation, AnomalyMetrics};
pub use dataset::LabeledScan;
pub use hyperparams::TrainOptions;
pub use risk::{train_risk_model, RiskMetrics};
pub use threat::{train_threat_model, ThreatMetrics};

/// Output of one training run, persisted as a unit
#[derive(Debug, Clone)]
pub struct TrainedModel<M: FamilyModel> {
    pub model: M,
    /// Fitted on the training split, applied before every prediction
    pub scaler: StandardScaler,
    pub metrics: M::Metrics,
}
