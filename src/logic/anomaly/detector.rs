//! Anomaly Detector
//!
//! Scales the 12-feature vector with the persisted scaler and asks the
//! isolation forest. A cold start bootstraps a detector on the spot.
//! Every failure reads as "not anomalous".

use ndarray::ArrayView1;

use crate::logic::error::ModelError;
use crate::logic::features::{AnomalyFeatures, FeatureExtractor};
use crate::logic::lifecycle::ModelManager;
use crate::logic::model::IsolationForest;
use crate::logic::scan::ScanData;
use crate::logic::training::TrainedModel;

/// Continuous anomaly score in (0, 1]; higher is more anomalous
pub fn anomaly_score(scan: &ScanData, trained: &TrainedModel<IsolationForest>) -> Result<f64, ModelError> {
    let features = AnomalyFeatures::extract(scan);
    let scaled = trained
        .scaler
        .transform_row(ArrayView1::from(features.as_slice()))?;
    trained.model.score_row(ArrayView1::from(&scaled[..]))
}

pub fn model_based_detection(scan: &ScanData, trained: &TrainedModel<IsolationForest>) -> Result<bool, ModelError> {
    let score = anomaly_score(scan, trained)?;
    Ok(score > trained.model.threshold)
}

/// Fail-safe detection: any error yields `false`
pub fn detect_anomaly(scan: &ScanData, models: &ModelManager) -> bool {
    let result = models
        .anomaly_for_detection()
        .and_then(|trained| model_based_detection(scan, &trained));

    match result {
        Ok(anomalous) => {
            log::debug!("Anomaly detection: {}", anomalous);
            anomalous
        }
        Err(e) => {
            log::warn!("Error in anomaly detection ({}), reporting not anomalous", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::EngineConfig;
    use crate::logic::lifecycle::{ModelFamily, ModelState};
    use crate::logic::scan::{Finding, ScanSummary};
    use crate::logic::training::TrainOptions;
    use tempfile::tempdir;

    fn scan_with(summary: [f64; 5], counts: [usize; 5]) -> ScanData {
        let levels = ["Critical", "High", "Medium", "Low", "Info"];
        let findings = levels
            .iter()
            .zip(counts)
            .flat_map(|(level, n)| (0..n).map(move |i| Finding::new(level, &format!("{level} {i}"))))
            .collect();
        ScanData {
            findings,
            summary: ScanSummary {
                overall: summary[0],
                ssl: summary[1],
                headers: summary[2],
                vulnerabilities: summary[3],
                server: summary[4],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_synthetic_model_separates_outlier() {
        let dir = tempdir().unwrap();
        let models = ModelManager::new(EngineConfig::with_model_dir(dir.path()));
        models.train_anomaly(None, &TrainOptions::default()).unwrap();

        let typical = scan_with([80.0, 85.0, 75.0, 90.0, 85.0], [0, 2, 5, 10, 20]);
        let outlier = scan_with([10.0, 5.0, 10.0, 5.0, 10.0], [30, 40, 50, 60, 5]);

        assert!(!detect_anomaly(&typical, &models));
        assert!(detect_anomaly(&outlier, &models));

        let trained = models.anomaly_model().unwrap();
        assert!(anomaly_score(&outlier, &trained).unwrap() > anomaly_score(&typical, &trained).unwrap());
    }

    #[test]
    fn test_cold_start_bootstraps() {
        let dir = tempdir().unwrap();
        let models = ModelManager::new(EngineConfig::with_model_dir(dir.path()));
        assert_eq!(models.state(ModelFamily::Anomaly), ModelState::Absent);

        // Result is meaningless, only the side effect matters
        let _ = detect_anomaly(&ScanData::default(), &models);
        assert_eq!(models.state(ModelFamily::Anomaly), ModelState::Loaded);
        assert!(models.anomaly_model().unwrap().metrics.bootstrap);
    }

    #[test]
    fn test_disabled_is_not_anomalous() {
        let dir = tempdir().unwrap();
        let mut config = EngineConfig::with_model_dir(dir.path());
        config.ml_enabled = false;
        let models = ModelManager::new(config);
        let outlier = scan_with([0.0; 5], [100, 100, 0, 0, 0]);
        assert!(!detect_anomaly(&outlier, &models));
    }
}
