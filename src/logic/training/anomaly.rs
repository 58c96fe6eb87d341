//! Anomaly model training
//!
//! Isolation forest over the 12 anomaly features. The scaler is fitted on
//! the whole set and evaluation (when labels exist) runs on the same rows:
//! the detector is unsupervised, labels only grade it.

use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;
use crate::logic::error::{ModelError, TrainingError};
use crate::logic::features::AnomalyFeatures;
use crate::logic::lifecycle::{ArtifactStore, FamilyModel, ModelFamily};
use crate::logic::model::metrics::binary_report;
use crate::logic::model::{IsolationForest, IsolationForestParams, StandardScaler};

use super::dataset::{feature_matrix, LabeledScan};
use super::hyperparams::TrainOptions;
use super::synthetic::{anomaly_bootstrap_data, anomaly_data, SYNTHETIC_SAMPLES};
use super::TrainedModel;

/// Graded against `is_anomaly` labels (anomaly = positive class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvaluation {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mean_anomaly_score: f64,
    pub mean_normal_score: f64,
    pub score_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyMetrics {
    /// Absent when the data carried no complete label set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<AnomalyEvaluation>,
    /// Decision threshold on the anomaly score
    pub threshold: f64,
    pub model_type: String,
    pub params: IsolationForestParams,
    pub dataset_size: usize,
    pub synthetic_data: bool,
    /// Cold-start model fitted on uniform noise
    #[serde(default)]
    pub bootstrap: bool,
    pub training_date: DateTime<Utc>,
}

impl FamilyModel for IsolationForest {
    const FAMILY: ModelFamily = ModelFamily::Anomaly;
    type Metrics = AnomalyMetrics;

    fn n_features(&self) -> usize {
        self.n_features
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Precision / recall / F1 and mean score separation
pub fn evaluate(model: &IsolationForest, x: &Array2<f64>, labels: &[bool]) -> Result<AnomalyEvaluation, ModelError> {
    let scores = model.score(x.view())?;
    let predicted: Vec<bool> = scores.iter().map(|&s| s > model.threshold).collect();
    let report = binary_report(labels, &predicted);

    let (anomalous, normal): (Vec<(f64, bool)>, Vec<(f64, bool)>) = scores
        .iter()
        .copied()
        .zip(labels.iter().copied())
        .partition(|&(_, label)| label);
    let anomalous: Vec<f64> = anomalous.into_iter().map(|(s, _)| s).collect();
    let normal: Vec<f64> = normal.into_iter().map(|(s, _)| s).collect();

    let mean_anomaly_score = mean(&anomalous);
    let mean_normal_score = mean(&normal);
    Ok(AnomalyEvaluation {
        precision: report.precision,
        recall: report.recall,
        f1: report.f1,
        mean_anomaly_score,
        mean_normal_score,
        score_difference: mean_anomaly_score - mean_normal_score,
    })
}

fn fit(
    x: Array2<f64>,
    labels: Option<Vec<bool>>,
    params: IsolationForestParams,
    synthetic: bool,
    bootstrap: bool,
    config: &EngineConfig,
) -> Result<TrainedModel<IsolationForest>, TrainingError> {
    let degenerate = |e: ModelError| TrainingError::Degenerate(e.to_string());

    let scaler = StandardScaler::fit(x.view());
    let x_scaled = scaler.transform(x.view()).map_err(degenerate)?;
    let model = IsolationForest::fit(x_scaled.view(), params, config.random_seed);

    let evaluation = match labels {
        Some(labels) => Some(evaluate(&model, &x_scaled, &labels).map_err(degenerate)?),
        None => None,
    };

    let metrics = AnomalyMetrics {
        evaluation,
        threshold: model.threshold,
        model_type: ModelFamily::Anomaly.model_type().to_string(),
        params,
        dataset_size: x.nrows(),
        synthetic_data: synthetic,
        bootstrap,
        training_date: Utc::now(),
    };
    Ok(TrainedModel { model, scaler, metrics })
}

/// Train the anomaly detector. `None` trains on the synthetic generator;
/// an empty slice is an error. Persists when `options.save` is set.
pub fn train_anomaly_model(
    data: Option<&[LabeledScan]>,
    options: &TrainOptions<IsolationForestParams>,
    config: &EngineConfig,
) -> Result<TrainedModel<IsolationForest>, TrainingError> {
    let started = Instant::now();

    let (x, labels, synthetic) = match data {
        None => {
            log::info!("No training data provided, generating synthetic anomaly data");
            let (x, labels) = anomaly_data(SYNTHETIC_SAMPLES, config.random_seed);
            (x, Some(labels), true)
        }
        Some([]) => return Err(TrainingError::InsufficientData { needed: 1, got: 0 }),
        Some(scans) => {
            log::info!("Training anomaly model with {} real data points", scans.len());
            let labels: Option<Vec<bool>> = scans.iter().map(|s| s.is_anomaly).collect();
            (feature_matrix::<AnomalyFeatures>(scans), labels, false)
        }
    };

    if options.tune {
        log::debug!("Anomaly training has no tuning grid, using given parameters");
    }
    let trained = fit(x, labels, options.params, synthetic, false, config)?;
    if options.save {
        ArtifactStore::from_config(config).save(&trained)?;
    }

    match &trained.metrics.evaluation {
        Some(eval) => log::info!(
            "Anomaly model trained in {}ms: precision={:.3} recall={:.3} f1={:.3}",
            started.elapsed().as_millis(),
            eval.precision,
            eval.recall,
            eval.f1
        ),
        None => log::info!(
            "Anomaly model trained in {}ms on {} unlabelled samples",
            started.elapsed().as_millis(),
            trained.metrics.dataset_size
        ),
    }
    Ok(trained)
}

/// Cold-start detector: 100 rows of uniform noise, default parameters,
/// always persisted. Meaningless until a real training run replaces it.
pub fn bootstrap_anomaly_model(config: &EngineConfig) -> Result<TrainedModel<IsolationForest>, TrainingError> {
    let started = Instant::now();
    log::warn!("No anomaly model found, bootstrapping one from random data");

    let x = anomaly_bootstrap_data(config.random_seed);
    let trained = fit(x, None, IsolationForestParams::default(), true, true, config)?;
    ArtifactStore::from_config(config).save(&trained)?;

    log::info!("Bootstrap anomaly model ready in {}ms", started.elapsed().as_millis());
    Ok(trained)
}
