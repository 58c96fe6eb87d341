//! Risk model training
//!
//! Gradient-boosted regression of the 0 - 100 risk score from the 31 risk
//! features.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;
use crate::logic::error::TrainingError;
use crate::logic::features::{FeatureDomain, RiskFeatures};
use crate::logic::lifecycle::{ArtifactStore, FamilyModel, ModelFamily};
use crate::logic::model::metrics::{regression_report, RegressionReport};
use crate::logic::model::{GradientBoostingParams, GradientBoostingRegressor, StandardScaler};

use super::dataset::{feature_matrix, select, select_rows, train_test_split, LabeledScan};
use super::hyperparams::TrainOptions;
use super::synthetic::{risk_data, SYNTHETIC_SAMPLES};
use super::tuning::tune_risk;
use super::TrainedModel;

/// Importances kept in the top list
const TOP_IMPORTANCES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    #[serde(flatten)]
    pub regression: RegressionReport,
    /// Importance per feature name
    pub feature_importance: BTreeMap<String, f64>,
    /// Highest importances, descending
    pub top_feature_importance: Vec<(String, f64)>,
    pub model_type: String,
    pub params: GradientBoostingParams,
    pub train_samples: usize,
    pub test_samples: usize,
    pub synthetic_data: bool,
    pub training_date: DateTime<Utc>,
}

impl FamilyModel for GradientBoostingRegressor {
    const FAMILY: ModelFamily = ModelFamily::Risk;
    type Metrics = RiskMetrics;

    fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Named importances, descending
pub fn ranked_importances(importances: &[f64]) -> Vec<(String, f64)> {
    let names = FeatureDomain::Risk.names();
    let mut ranked: Vec<(String, f64)> = importances
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let name = names.get(i).map(|n| n.to_string()).unwrap_or_else(|| format!("feature_{i}"));
            (name, v)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

fn prepare(
    data: Option<&[LabeledScan]>,
    config: &EngineConfig,
) -> (Array2<f64>, Vec<f64>, bool) {
    match data {
        Some(scans) if scans.len() >= config.min_training_samples => {
            log::info!("Training risk model with {} real data points", scans.len());
            let x = feature_matrix::<RiskFeatures>(scans);
            let y = scans.iter().map(LabeledScan::risk_target).collect();
            (x, y, false)
        }
        _ => {
            log::info!("Insufficient real training data, generating synthetic risk data");
            let (x, y) = risk_data(SYNTHETIC_SAMPLES, config.random_seed);
            (x, y, true)
        }
    }
}

/// Train the risk regressor. Persists model, scaler and metrics when
/// `options.save` is set.
pub fn train_risk_model(
    data: Option<&[LabeledScan]>,
    options: &TrainOptions<GradientBoostingParams>,
    config: &EngineConfig,
) -> Result<TrainedModel<GradientBoostingRegressor>, TrainingError> {
    let started = Instant::now();
    let seed = config.random_seed;
    let (x, y, synthetic_data) = prepare(data, config);

    let split = train_test_split(x.nrows(), options.test_size, seed);
    if split.train.len() < 2 || split.test.is_empty() {
        return Err(TrainingError::InsufficientData {
            needed: 3,
            got: x.nrows(),
        });
    }

    let x_train = select_rows(x.view(), &split.train);
    let x_test = select_rows(x.view(), &split.test);
    let y_train = select(&y, &split.train);
    let y_test = select(&y, &split.test);

    let scaler = StandardScaler::fit(x_train.view());
    let degenerate = |e: crate::logic::error::ModelError| TrainingError::Degenerate(e.to_string());
    let x_train = scaler.transform(x_train.view()).map_err(degenerate)?;
    let x_test = scaler.transform(x_test.view()).map_err(degenerate)?;

    let params = if options.tune {
        log::info!("Performing risk hyperparameter tuning");
        tune_risk(x_train.view(), &y_train, seed)
    } else {
        options.params
    };
    let model = GradientBoostingRegressor::fit(x_train.view(), &y_train, params, seed);

    let pred = model.predict(x_test.view()).map_err(degenerate)?;
    let regression = regression_report(&y_test, &pred);
    let ranked = ranked_importances(&model.feature_importances);

    let metrics = RiskMetrics {
        regression,
        feature_importance: ranked.iter().cloned().collect(),
        top_feature_importance: ranked.into_iter().take(TOP_IMPORTANCES).collect(),
        model_type: ModelFamily::Risk.model_type().to_string(),
        params,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        synthetic_data,
        training_date: Utc::now(),
    };

    let trained = TrainedModel { model, scaler, metrics };
    if options.save {
        ArtifactStore::from_config(config).save(&trained)?;
    }

    log::info!(
        "Risk model trained in {}ms: rmse={:.3} mae={:.3} r2={:.3}",
        started.elapsed().as_millis(),
        trained.metrics.regression.rmse,
        trained.metrics.regression.mae,
        trained.metrics.regression.r2
    );
    Ok(trained)
}
