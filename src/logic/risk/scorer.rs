//! Risk scorer: model path with an explicit rule-based fallback branch

use ndarray::ArrayView1;

use crate::logic::error::ModelError;
use crate::logic::features::{FeatureExtractor, RiskFeatures};
use crate::logic::lifecycle::ModelManager;
use crate::logic::model::GradientBoostingRegressor;
use crate::logic::scan::ScanData;
use crate::logic::training::TrainedModel;

use super::rule_based::{category_scores, rule_based_score};
use super::types::{RiskResult, ScoringMethod};

/// Predicted overall score with the rule-derived category breakdown
pub fn model_based_score(
    scan: &ScanData,
    trained: &TrainedModel<GradientBoostingRegressor>,
) -> Result<RiskResult, ModelError> {
    let features = RiskFeatures::extract(scan);
    let scaled = trained
        .scaler
        .transform_row(ArrayView1::from(features.as_slice()))?;
    let predicted = trained.model.predict_row(ArrayView1::from(&scaled[..]))?;
    if !predicted.is_finite() {
        return Err(ModelError::NotFitted("risk regressor"));
    }
    Ok(RiskResult::new(predicted, category_scores(scan), ScoringMethod::MachineLearning))
}

/// Score a scan. Uses the persisted model when one exists, otherwise (or on
/// any model error) the category formulas. Never trains.
pub fn score_risk(scan: &ScanData, models: &ModelManager) -> RiskResult {
    let trained = match models.risk_model() {
        Ok(trained) => trained,
        Err(e) => {
            log::debug!("Risk model unavailable ({}), using rule-based scoring", e);
            return rule_based_score(scan);
        }
    };

    match model_based_score(scan, &trained) {
        Ok(result) => {
            log::debug!("Risk model score {:.1} ({})", result.overall_score, result.risk_level);
            result
        }
        Err(e) => {
            log::warn!("Error in model-based risk scoring ({}), falling back to rules", e);
            rule_based_score(scan)
        }
    }
}
