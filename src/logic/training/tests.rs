use ndarray::ArrayView1;
use tempfile::tempdir;

use super::*;
use crate::logic::config::EngineConfig;
use crate::logic::error::TrainingError;
use crate::logic::features::{FeatureExtractor, RiskFeatures};
use crate::logic::lifecycle::ArtifactStore;
use crate::logic::model::{
    GradientBoostingParams, GradientBoostingRegressor, IsolationForest, IsolationForestParams,
    RandomForestClassifier, RandomForestParams,
};
use crate::logic::scan::fixtures::{high_risk_scan, sample_scan};

fn small_risk() -> TrainOptions<GradientBoostingParams> {
    TrainOptions::with_params(GradientBoostingParams {
        n_estimators: 20,
        learning_rate: 0.2,
        ..Default::default()
    })
}

fn small_threat() -> TrainOptions<RandomForestParams> {
    TrainOptions::with_params(RandomForestParams {
        n_estimators: 10,
        ..Default::default()
    })
}

fn small_anomaly() -> TrainOptions<IsolationForestParams> {
    TrainOptions::with_params(IsolationForestParams {
        n_estimators: 50,
        ..Default::default()
    })
}

#[test]
fn test_risk_round_trip_is_bit_identical() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());

    let trained = train_risk_model(None, &small_risk(), &config).unwrap();
    assert!(trained.metrics.synthetic_data);
    assert_eq!(trained.model.n_features, 31);

    let loaded = ArtifactStore::from_config(&config)
        .load::<GradientBoostingRegressor>()
        .unwrap();

    for scan in [sample_scan(), high_risk_scan()] {
        let features = RiskFeatures::extract(&scan);
        let row = ArrayView1::from(features.as_slice());

        let a = trained.scaler.transform_row(row).unwrap();
        let b = loaded.scaler.transform_row(row).unwrap();
        assert_eq!(a, b);

        let pa = trained.model.predict_row(ArrayView1::from(&a[..])).unwrap();
        let pb = loaded.model.predict_row(ArrayView1::from(&b[..])).unwrap();
        assert_eq!(pa.to_bits(), pb.to_bits());
    }
}

#[test]
fn test_risk_synthetic_metrics() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());
    let mut options = small_risk();
    options.save = false;

    let trained = train_risk_model(None, &options, &config).unwrap();
    let m = &trained.metrics;
    assert_eq!(m.train_samples + m.test_samples, 1000);
    assert_eq!(m.test_samples, 200);
    // Half the synthetic target is unexplained noise; only sanity-check the fit
    assert!(m.regression.rmse.is_finite());
    assert!(m.regression.mae < 25.0, "mae {}", m.regression.mae);
    assert_eq!(m.top_feature_importance.len(), 10);
    assert_eq!(m.feature_importance.len(), 31);
    assert!(m.top_feature_importance[0].1 >= m.top_feature_importance[9].1);

    // Not persisted
    assert!(!ArtifactStore::from_config(&config).exists(crate::logic::lifecycle::ModelFamily::Risk));
}

#[test]
fn test_risk_training_is_deterministic() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());
    let mut options = small_risk();
    options.save = false;

    let a = train_risk_model(None, &options, &config).unwrap();
    let b = train_risk_model(None, &options, &config).unwrap();
    assert_eq!(a.model, b.model);
    assert_eq!(a.scaler, b.scaler);
}

#[test]
fn test_small_real_set_falls_back_to_synthetic() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());
    let mut options = small_risk();
    options.save = false;

    let scans: Vec<LabeledScan> = (0..5).map(|_| LabeledScan::new(sample_scan())).collect();
    let trained = train_risk_model(Some(&scans), &options, &config).unwrap();
    assert!(trained.metrics.synthetic_data);
}

#[test]
fn test_threat_synthetic_training() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());

    let trained = train_threat_model(None, &small_threat(), &config).unwrap();
    let m = &trained.metrics;
    assert_eq!(m.class_names.len(), 9);
    assert_eq!(trained.model.classes, m.class_names);
    assert!(m.synthetic_data);
    assert!(m.classification.accuracy > 0.5, "accuracy {}", m.classification.accuracy);
    assert_eq!(m.classification.confusion_matrix.len(), 81);

    let loaded = ArtifactStore::from_config(&config)
        .load::<RandomForestClassifier>()
        .unwrap();
    assert_eq!(loaded.model, trained.model);
}

#[test]
fn test_threat_single_class_is_degenerate() {
    let dir = tempdir().unwrap();
    let mut config = EngineConfig::with_model_dir(dir.path());
    config.min_training_samples = 4;

    let scans: Vec<LabeledScan> = (0..6)
        .map(|_| {
            let mut s = LabeledScan::new(sample_scan());
            s.threat_type = Some("xss".into());
            s
        })
        .collect();
    let err = train_threat_model(Some(&scans), &small_threat(), &config).unwrap_err();
    assert!(matches!(err, TrainingError::Degenerate(_)));
}

#[test]
fn test_threat_real_labels_become_classes() {
    let dir = tempdir().unwrap();
    let mut config = EngineConfig::with_model_dir(dir.path());
    config.min_training_samples = 10;
    let mut options = small_threat();
    options.save = false;

    let scans: Vec<LabeledScan> = (0..20)
        .map(|i| {
            let mut s = if i % 2 == 0 {
                LabeledScan::new(high_risk_scan())
            } else {
                LabeledScan::new(sample_scan())
            };
            if i % 2 == 0 {
                s.threat_type = Some("malware".into());
            }
            s
        })
        .collect();
    let trained = train_threat_model(Some(&scans), &options, &config).unwrap();
    assert_eq!(trained.model.classes, vec!["malware".to_string(), "none".to_string()]);
    assert!(!trained.metrics.synthetic_data);
}

#[test]
fn test_anomaly_synthetic_evaluation() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());

    let trained = train_anomaly_model(None, &small_anomaly(), &config).unwrap();
    let eval = trained.metrics.evaluation.as_ref().unwrap();
    assert!(eval.score_difference > 0.0);
    assert!(eval.f1 > 0.6, "f1 {}", eval.f1);
    assert_eq!(trained.metrics.dataset_size, 1000);
    assert!(!trained.metrics.bootstrap);

    let loaded = ArtifactStore::from_config(&config).load::<IsolationForest>().unwrap();
    assert_eq!(loaded.model.threshold.to_bits(), trained.model.threshold.to_bits());
}

#[test]
fn test_anomaly_empty_data_is_error() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());
    let err = train_anomaly_model(Some(&[]), &small_anomaly(), &config).unwrap_err();
    assert!(matches!(err, TrainingError::InsufficientData { got: 0, .. }));
}

#[test]
fn test_anomaly_partial_labels_skip_evaluation() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());
    let mut options = small_anomaly();
    options.save = false;

    let mut scans: Vec<LabeledScan> = (0..10).map(|_| LabeledScan::new(sample_scan())).collect();
    scans[0].is_anomaly = Some(false);
    let trained = train_anomaly_model(Some(&scans), &options, &config).unwrap();
    assert!(trained.metrics.evaluation.is_none());
    assert!(!trained.metrics.synthetic_data);
}

#[test]
fn test_bootstrap_persists() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::with_model_dir(dir.path());

    let trained = bootstrap_anomaly_model(&config).unwrap();
    assert!(trained.metrics.bootstrap);
    assert_eq!(trained.metrics.dataset_size, 100);
    assert_eq!(trained.model.n_features, 12);

    let loaded = ArtifactStore::from_config(&config).load::<IsolationForest>().unwrap();
    assert!(loaded.metrics.bootstrap);
}
