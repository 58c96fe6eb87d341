//! Threat model training
//!
//! Random-forest classification over the 22 threat features. Real data must
//! carry at least two distinct `threat_type` labels.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;
use crate::logic::error::{ModelError, TrainingError};
use crate::logic::features::{FeatureDomain, ThreatFeatures};
use crate::logic::lifecycle::{ArtifactStore, FamilyModel, ModelFamily};
use crate::logic::model::metrics::{classification_report, ClassificationReport};
use crate::logic::model::{RandomForestClassifier, RandomForestParams, StandardScaler};
use crate::logic::threat::ThreatCategory;

use super::dataset::{encode_labels, feature_matrix, select, select_rows, stratified_split, LabeledScan};
use super::hyperparams::TrainOptions;
use super::synthetic::{threat_data, SYNTHETIC_SAMPLES};
use super::tuning::tune_threat;
use super::TrainedModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatMetrics {
    #[serde(flatten)]
    pub classification: ClassificationReport,
    pub feature_importance: BTreeMap<String, f64>,
    /// Index-aligned with the model's probability vector
    pub class_names: Vec<String>,
    pub model_type: String,
    pub params: RandomForestParams,
    pub train_samples: usize,
    pub test_samples: usize,
    pub synthetic_data: bool,
    pub training_date: DateTime<Utc>,
}

impl FamilyModel for RandomForestClassifier {
    const FAMILY: ModelFamily = ModelFamily::Threat;
    type Metrics = ThreatMetrics;

    fn n_features(&self) -> usize {
        self.n_features
    }
}

struct Prepared {
    x: Array2<f64>,
    labels: Vec<usize>,
    classes: Vec<String>,
    synthetic: bool,
}

fn prepare(data: Option<&[LabeledScan]>, config: &EngineConfig) -> Result<Prepared, TrainingError> {
    match data {
        Some(scans) if scans.len() >= config.min_training_samples => {
            log::info!("Training threat model with {} real data points", scans.len());
            let (classes, labels) = encode_labels(scans.iter().map(LabeledScan::threat_label));
            if classes.len() < 2 {
                return Err(TrainingError::Degenerate(format!(
                    "threat training needs at least two classes, got {:?}",
                    classes
                )));
            }
            Ok(Prepared {
                x: feature_matrix::<ThreatFeatures>(scans),
                labels,
                classes,
                synthetic: false,
            })
        }
        _ => {
            log::info!("Insufficient real training data, generating synthetic threat data");
            let (x, labels) = threat_data(SYNTHETIC_SAMPLES, config.random_seed);
            Ok(Prepared {
                x,
                labels,
                classes: ThreatCategory::names(),
                synthetic: true,
            })
        }
    }
}

fn named_importances(importances: &[f64]) -> BTreeMap<String, f64> {
    FeatureDomain::Threat
        .names()
        .iter()
        .zip(importances)
        .map(|(name, &v)| (name.to_string(), v))
        .collect()
}

/// Train the threat classifier. Persists model, scaler and metrics when
/// `options.save` is set.
pub fn train_threat_model(
    data: Option<&[LabeledScan]>,
    options: &TrainOptions<RandomForestParams>,
    config: &EngineConfig,
) -> Result<TrainedModel<RandomForestClassifier>, TrainingError> {
    let started = Instant::now();
    let seed = config.random_seed;
    let Prepared {
        x,
        labels,
        classes,
        synthetic,
    } = prepare(data, config)?;

    let split = stratified_split(&labels, options.test_size, seed);
    if split.train.is_empty() || split.test.is_empty() {
        return Err(TrainingError::Degenerate(format!(
            "empty split ({} train / {} test)",
            split.train.len(),
            split.test.len()
        )));
    }

    let y_train = select(&labels, &split.train);
    let y_test = select(&labels, &split.test);

    let scaler = StandardScaler::fit(select_rows(x.view(), &split.train).view());
    let degenerate = |e: ModelError| TrainingError::Degenerate(e.to_string());
    let x_train = scaler
        .transform(select_rows(x.view(), &split.train).view())
        .map_err(degenerate)?;
    let x_test = scaler
        .transform(select_rows(x.view(), &split.test).view())
        .map_err(degenerate)?;

    let params = if options.tune {
        log::info!("Performing threat hyperparameter tuning");
        tune_threat(x_train.view(), &y_train, &classes, seed)
    } else {
        options.params
    };
    let model = RandomForestClassifier::fit(x_train.view(), &y_train, classes.clone(), params, seed);

    let pred = model.predict(x_test.view()).map_err(degenerate)?;
    let classification = classification_report(&y_test, &pred, &classes);

    let metrics = ThreatMetrics {
        classification,
        feature_importance: named_importances(&model.feature_importances),
        class_names: classes,
        model_type: ModelFamily::Threat.model_type().to_string(),
        params,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        synthetic_data: synthetic,
        training_date: Utc::now(),
    };

    let trained = TrainedModel { model, scaler, metrics };
    if options.save {
        ArtifactStore::from_config(config).save(&trained)?;
    }

    log::info!(
        "Threat model trained in {}ms: accuracy={:.3} f1={:.3} classes={}",
        started.elapsed().as_millis(),
        trained.metrics.classification.accuracy,
        trained.metrics.classification.f1,
        trained.metrics.class_names.len()
    );
    Ok(trained)
}

#[cfg(test)]
impl ThreatMetrics {
    /// Minimal record for hand-built models
    pub(crate) fn placeholder(class_names: Vec<String>) -> Self {
        Self {
            classification: classification_report(&[], &[], &class_names),
            feature_importance: BTreeMap::new(),
            class_names,
            model_type: ModelFamily::Threat.model_type().to_string(),
            params: RandomForestParams::default(),
            train_samples: 0,
            test_samples: 0,
            synthetic_data: true,
            training_date: Utc::now(),
        }
    }
}
