//! Threat Classifier
//!
//! Model path first, fallback rules on any model error.
//! Input: ScanData. Output: ThreatResult.

use ndarray::ArrayView1;

use crate::logic::error::ModelError;
use crate::logic::features::{FeatureExtractor, ThreatFeatures};
use crate::logic::lifecycle::ModelManager;
use crate::logic::model::RandomForestClassifier;
use crate::logic::scan::ScanData;
use crate::logic::training::TrainedModel;

use super::fallback::fallback_detection;
use super::recommendations::recommendation_list;
use super::rules::DETECTION_THRESHOLD;
use super::types::{DetectionMethod, ThreatCategory, ThreatDetail, ThreatResult};

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Classify a scan. Never fails: a missing or broken model degrades to
/// `fallback_detection`.
pub fn classify_threat(scan: &ScanData, models: &ModelManager) -> ThreatResult {
    let trained = match models.threat_model() {
        Ok(trained) => trained,
        Err(e) => {
            log::warn!("Threat model unavailable ({}), using fallback detection", e);
            return fallback_detection(scan);
        }
    };

    match model_based_classification(scan, &trained) {
        Ok(result) => {
            log::debug!(
                "Threat model: {} ({:.3}, detected={})",
                result.primary_threat_type,
                result.threat_confidence,
                result.threat_detected
            );
            result
        }
        Err(e) => {
            log::warn!("Threat classification failed ({}), using fallback detection", e);
            fallback_detection(scan)
        }
    }
}

// ============================================================================
// MODEL PATH
// ============================================================================

/// Class probabilities from the forest, mapped onto categories by class name.
/// Classes the model knows but the category set does not are ignored.
pub fn model_based_classification(
    scan: &ScanData,
    trained: &TrainedModel<RandomForestClassifier>,
) -> Result<ThreatResult, ModelError> {
    let features = ThreatFeatures::extract(scan);
    let scaled = trained
        .scaler
        .transform_row(ArrayView1::from(features.as_slice()))?;
    let proba = trained.model.predict_proba_row(ArrayView1::from(&scaled[..]))?;

    let mut result = ThreatResult::empty(DetectionMethod::Model);
    for (name, &p) in trained.model.classes.iter().zip(&proba) {
        let Some(category) = ThreatCategory::parse(name) else {
            log::debug!("Ignoring unknown threat class '{}'", name);
            continue;
        };
        result.threat_details.insert(category, ThreatDetail::new(p));

        if category.is_threat() && p > result.threat_confidence {
            result.threat_confidence = p;
            result.primary_threat_type = category;
        }
    }

    if result.threat_confidence >= DETECTION_THRESHOLD {
        result.threat_detected = true;
        result.recommendations = Some(recommendation_list(result.primary_threat_type));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{RandomForestParams, StandardScaler};
    use crate::logic::scan::fixtures::clean_scan;
    use crate::logic::training::ThreatMetrics;
    use ndarray::Array2;

    /// Two-class forest over a single varying feature
    fn toy_model(classes: Vec<String>) -> TrainedModel<RandomForestClassifier> {
        let n = 40;
        let cols = crate::logic::features::THREAT_FEATURE_COUNT;
        let x = Array2::from_shape_fn((n, cols), |(i, j)| if j == 0 && i >= n / 2 { 5.0 } else { 0.0 });
        let labels: Vec<usize> = (0..n).map(|i| usize::from(i >= n / 2)).collect();
        let params = RandomForestParams {
            n_estimators: 5,
            ..Default::default()
        };
        let scaler = StandardScaler::fit(x.view());
        let scaled = scaler.transform(x.view()).unwrap();
        let model = RandomForestClassifier::fit(scaled.view(), &labels, classes.clone(), params, 7);
        TrainedModel {
            model,
            scaler,
            metrics: ThreatMetrics::placeholder(classes),
        }
    }

    #[test]
    fn test_model_path_detects_high_probability_class() {
        let trained = toy_model(vec!["none".into(), "sql_injection".into()]);
        let mut scan = clean_scan();
        scan.findings = (0..5)
            .map(|_| crate::logic::scan::Finding::new("Critical", "x"))
            .collect();

        let result = model_based_classification(&scan, &trained).unwrap();
        assert_eq!(result.detection_method, DetectionMethod::Model);
        assert_eq!(result.primary_threat_type, ThreatCategory::SqlInjection);
        assert!(result.threat_detected);
        assert!(result.recommendations.is_some());
        assert_eq!(result.threat_details.len(), 9);
    }

    #[test]
    fn test_model_path_clean_scan_is_none() {
        let trained = toy_model(vec!["none".into(), "sql_injection".into()]);
        let result = model_based_classification(&clean_scan(), &trained).unwrap();
        assert!(!result.threat_detected);
        assert!(result.probability(ThreatCategory::NoThreat) > 0.5);
        assert!(result.recommendations.is_none());
    }

    #[test]
    fn test_unknown_class_names_are_skipped() {
        let trained = toy_model(vec!["none".into(), "ransomware".into()]);
        let mut scan = clean_scan();
        scan.findings = (0..5)
            .map(|_| crate::logic::scan::Finding::new("Critical", "x"))
            .collect();
        let result = model_based_classification(&scan, &trained).unwrap();
        assert_eq!(result.primary_threat_type, ThreatCategory::NoThreat);
        assert!(!result.threat_detected);
    }
}
