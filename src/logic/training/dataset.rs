//! Labelled scans and dataset plumbing
//!
//! Real training data is a list of scan records carrying an optional label
//! per family. Splits and folds are index-based and seeded.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureExtractor;
use crate::logic::risk::RiskCategory;
use crate::logic::scan::ScanData;

/// Target used when a risk sample carries no usable label
pub const DEFAULT_RISK_TARGET: f64 = 50.0;

/// Label used when a threat sample carries none
pub const DEFAULT_THREAT_LABEL: &str = "none";

/// A scan record plus whatever labels the caller has for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledScan {
    #[serde(flatten)]
    pub scan: ScanData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_risk_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,

    /// `{ "<category>": { "score": n, ... } }`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_scores: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anomaly: Option<bool>,
}

impl LabeledScan {
    pub fn new(scan: ScanData) -> Self {
        Self {
            scan,
            ..Default::default()
        }
    }

    /// `overall_risk_score`, else `risk_score`, else the weighted mean of the
    /// known category scores, else 50
    pub fn risk_target(&self) -> f64 {
        if let Some(score) = self.overall_risk_score.or(self.risk_score) {
            return score;
        }

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for category in RiskCategory::ALL {
            if let Some(entry) = self.category_scores.get(category.as_str()) {
                let score = entry.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
                weighted += score * category.weight();
                total_weight += category.weight();
            }
        }
        if total_weight > 0.0 {
            weighted / total_weight
        } else {
            DEFAULT_RISK_TARGET
        }
    }

    pub fn threat_label(&self) -> &str {
        self.threat_type.as_deref().unwrap_or(DEFAULT_THREAT_LABEL)
    }
}

/// Parse a JSON array of labelled scans
pub fn parse_labeled_scans(json: &str) -> Result<Vec<LabeledScan>, serde_json::Error> {
    serde_json::from_str(json)
}

// ============================================================================
// MATRICES
// ============================================================================

/// One row per scan, in the extractor's layout
pub fn feature_matrix<E: FeatureExtractor>(scans: &[LabeledScan]) -> Array2<f64> {
    let width = E::DOMAIN.count();
    let mut values = Vec::with_capacity(scans.len() * width);
    for s in scans {
        values.extend_from_slice(E::extract(&s.scan).as_slice());
    }
    Array2::from_shape_vec((scans.len(), width), values).unwrap_or_else(|_| Array2::zeros((0, width)))
}

/// Sorted distinct labels and each sample's index into them
pub fn encode_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> (Vec<String>, Vec<usize>) {
    let raw: Vec<&str> = labels.into_iter().collect();
    let classes: Vec<String> = raw
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let encoded = raw
        .iter()
        .map(|l| classes.iter().position(|c| c == l).unwrap_or(0))
        .collect();
    (classes, encoded)
}

pub fn select_rows(x: ArrayView2<f64>, idx: &[usize]) -> Array2<f64> {
    x.select(Axis(0), idx)
}

pub fn select<T: Clone>(values: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| values[i].clone()).collect()
}

// ============================================================================
// SPLITS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn test_count(n: usize, test_size: f64) -> usize {
    ((n as f64 * test_size).ceil() as usize).min(n)
}

/// Shuffled hold-out split; `ceil(n · test_size)` rows go to test
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Split {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = test_count(n, test_size);
    let test = idx[..n_test].to_vec();
    let train = idx[n_test..].to_vec();
    Split { train, test }
}

/// Hold-out split that keeps each class's share in both halves
pub fn stratified_split(labels: &[usize], test_size: f64, seed: u64) -> Split {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        by_class.entry(l).or_default().push(i);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for members in by_class.values_mut() {
        members.shuffle(&mut rng);
        let n_test = ((members.len() as f64 * test_size).round() as usize).min(members.len());
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Split { train, test }
}

/// `k` shuffled folds; each index is in exactly one test fold
pub fn k_fold(n: usize, k: usize, seed: u64) -> Vec<Split> {
    let k = k.clamp(2, n.max(2));
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));

    (0..k)
        .map(|fold| {
            let start = fold * n / k;
            let end = (fold + 1) * n / k;
            let test = idx[start..end].to_vec();
            let train = idx[..start].iter().chain(&idx[end..]).copied().collect();
            Split { train, test }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_target_precedence() {
        let mut s = LabeledScan::default();
        assert_eq!(s.risk_target(), 50.0);

        s.category_scores
            .insert("vulnerability".into(), json!({ "score": 80.0 }));
        s.category_scores.insert("content".into(), json!({ "score": 20.0 }));
        // (80·0.3 + 20·0.1) / 0.4
        assert!((s.risk_target() - 65.0).abs() < 1e-9);

        s.risk_score = Some(30.0);
        assert_eq!(s.risk_target(), 30.0);
        s.overall_risk_score = Some(70.0);
        assert_eq!(s.risk_target(), 70.0);
    }

    #[test]
    fn test_labeled_scan_flattens_scan_fields() {
        let parsed = parse_labeled_scans(
            r#"[{ "findings": [{ "severity": "High", "title": "x" }], "threat_type": "xss", "is_anomaly": true }]"#,
        )
        .unwrap();
        assert_eq!(parsed[0].scan.findings.len(), 1);
        assert_eq!(parsed[0].threat_label(), "xss");
        assert_eq!(parsed[0].is_anomaly, Some(true));
        assert_eq!(LabeledScan::default().threat_label(), "none");
    }

    #[test]
    fn test_encode_labels_sorted() {
        let (classes, y) = encode_labels(["xss", "none", "xss", "csrf"]);
        assert_eq!(classes, vec!["csrf", "none", "xss"]);
        assert_eq!(y, vec![2, 1, 2, 0]);
    }

    #[test]
    fn test_train_test_split_partitions() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
        assert_eq!(split, train_test_split(10, 0.2, 42));
    }

    #[test]
    fn test_stratified_split_keeps_shares() {
        let labels: Vec<usize> = (0..50).map(|i| if i < 40 { 0 } else { 1 }).collect();
        let split = stratified_split(&labels, 0.2, 7);
        let test_ones = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(split.test.len(), 10);
        assert_eq!(test_ones, 2);
    }

    #[test]
    fn test_k_fold_covers_every_index_once() {
        let folds = k_fold(10, 3, 1);
        assert_eq!(folds.len(), 3);
        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        for f in &folds {
            assert_eq!(f.train.len() + f.test.len(), 10);
        }
    }
}
