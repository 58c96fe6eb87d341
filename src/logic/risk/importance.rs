//! Feature importance analysis for the risk regressor

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureDomain;
use crate::logic::lifecycle::ModelFamily;
use crate::logic::model::GradientBoostingRegressor;

/// Layout ranges per feature group
pub const FEATURE_GROUPS: [(&str, Range<usize>); 6] = [
    ("severity", 0..5),
    ("ssl", 5..10),
    ("headers", 10..17),
    ("content", 17..23),
    ("server", 23..27),
    ("reputation", 27..31),
];

const TOP_FEATURES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceModelInfo {
    pub model_type: String,
    pub n_estimators: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceReport {
    /// Descending by importance
    pub feature_importance: Vec<FeatureImportance>,
    /// Percent of the total per feature group
    pub category_importance: BTreeMap<String, f64>,
    pub top_features: Vec<FeatureImportance>,
    pub model_info: ImportanceModelInfo,
}

pub fn analyze_feature_importance(model: &GradientBoostingRegressor) -> ImportanceReport {
    let names = FeatureDomain::Risk.names();
    let importances = &model.feature_importances;

    let mut feature_importance: Vec<FeatureImportance> = importances
        .iter()
        .enumerate()
        .map(|(i, &importance)| FeatureImportance {
            feature: names
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("feature_{i}")),
            importance,
            percentage: importance * 100.0,
        })
        .collect();
    feature_importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    let group_sums: Vec<(&str, f64)> = FEATURE_GROUPS
        .iter()
        .map(|(name, range)| {
            let sum = importances.get(range.clone()).map(|s| s.iter().sum()).unwrap_or(0.0);
            (*name, sum)
        })
        .collect();
    let total: f64 = group_sums.iter().map(|(_, v)| v).sum();
    let category_importance = group_sums
        .into_iter()
        .map(|(name, v)| {
            let pct = if total > 0.0 { v / total * 100.0 } else { 0.0 };
            (name.to_string(), pct)
        })
        .collect();

    ImportanceReport {
        top_features: feature_importance.iter().take(TOP_FEATURES).cloned().collect(),
        feature_importance,
        category_importance,
        model_info: ImportanceModelInfo {
            model_type: ModelFamily::Risk.model_type().to_string(),
            n_estimators: model.params.n_estimators,
            max_depth: model.params.max_depth,
        },
    }
}
