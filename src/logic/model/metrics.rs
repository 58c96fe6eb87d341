//! Evaluation metrics
//!
//! Regression errors for the risk model, classification reports for the
//! threat model and binary precision/recall for the anomaly detector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// REGRESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    /// Mean |error| / |truth| in percent, over samples with non-zero truth
    pub mean_relative_error: f64,
    /// Share (percent) of predictions within N points, keyed `within_<N>`
    pub error_distribution: BTreeMap<String, f64>,
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean(y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)))
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean(y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()))
}

/// Coefficient of determination. A constant target gives 0 unless the fit is exact.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let m = mean(y_true.iter().copied());
    let ss_tot: f64 = y_true.iter().map(|t| (t - m).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn regression_report(y_true: &[f64], y_pred: &[f64]) -> RegressionReport {
    let mse = mean_squared_error(y_true, y_pred);

    let relative: Vec<f64> = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, _)| **t != 0.0)
        .map(|(t, p)| (t - p).abs() / t.abs() * 100.0)
        .collect();

    let n = y_true.len().max(1) as f64;
    let error_distribution = [5u32, 10, 15, 20]
        .iter()
        .map(|&limit| {
            let within = y_true
                .iter()
                .zip(y_pred)
                .filter(|(t, p)| (*t - *p).abs() <= limit as f64)
                .count();
            (format!("within_{limit}"), within as f64 / n * 100.0)
        })
        .collect();

    RegressionReport {
        mse,
        rmse: mse.sqrt(),
        mae: mean_absolute_error(y_true, y_pred),
        r2: r2_score(y_true, y_pred),
        mean_relative_error: mean(relative.into_iter()),
        error_distribution,
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    /// Support-weighted averages over classes
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub per_class: BTreeMap<String, ClassMetrics>,
    /// Counts keyed `"<true>_as_<pred>"`, zero cells included
    pub confusion_matrix: BTreeMap<String, usize>,
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// `labels` index into `classes`
pub fn classification_report(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> ClassificationReport {
    let k = classes.len();
    let mut matrix = vec![vec![0usize; k]; k];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t < k && p < k {
            matrix[t][p] += 1;
        }
    }

    let mut per_class = BTreeMap::new();
    let (mut wp, mut wr, mut wf) = (0.0, 0.0, 0.0);
    let total: usize = matrix.iter().flatten().sum();

    for (c, name) in classes.iter().enumerate() {
        let tp = matrix[c][c];
        let support: usize = matrix[c].iter().sum();
        let predicted: usize = matrix.iter().map(|row| row[c]).sum();
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f = f1(precision, recall);

        let w = ratio(support, total);
        wp += w * precision;
        wr += w * recall;
        wf += w * f;

        per_class.insert(
            name.clone(),
            ClassMetrics {
                precision,
                recall,
                f1: f,
                support,
            },
        );
    }

    let mut confusion_matrix = BTreeMap::new();
    for (t, true_name) in classes.iter().enumerate() {
        for (p, pred_name) in classes.iter().enumerate() {
            confusion_matrix.insert(format!("{true_name}_as_{pred_name}"), matrix[t][p]);
        }
    }

    ClassificationReport {
        accuracy: accuracy(y_true, y_pred),
        precision: wp,
        recall: wr,
        f1: wf,
        per_class,
        confusion_matrix,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// `true` is the positive class
pub fn binary_report(y_true: &[bool], y_pred: &[bool]) -> BinaryReport {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t, p) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    BinaryReport {
        precision,
        recall,
        f1: f1(precision, recall),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_errors() {
        let t = [10.0, 20.0, 30.0, 40.0];
        let p = [12.0, 18.0, 30.0, 52.0];
        let r = regression_report(&t, &p);
        assert_eq!(r.mse, (4.0 + 4.0 + 0.0 + 144.0) / 4.0);
        assert_eq!(r.mae, 4.0);
        assert!((r.rmse - 38f64.sqrt()).abs() < 1e-12);
        assert_eq!(r.error_distribution["within_5"], 75.0);
        assert_eq!(r.error_distribution["within_20"], 100.0);
        // (20% + 10% + 0% + 30%) / 4
        assert!((r.mean_relative_error - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let t = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&t, &t), 1.0);
        assert_eq!(r2_score(&t, &[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_classification_report() {
        let classes: Vec<String> = vec!["none".into(), "xss".into()];
        let t = [0, 0, 0, 1, 1];
        let p = [0, 0, 1, 1, 0];
        let r = classification_report(&t, &p, &classes);

        assert_eq!(r.accuracy, 0.6);
        assert_eq!(r.confusion_matrix["none_as_xss"], 1);
        assert_eq!(r.confusion_matrix["xss_as_none"], 1);
        assert_eq!(r.confusion_matrix["xss_as_xss"], 1);

        let none = &r.per_class["none"];
        assert_eq!(none.support, 3);
        assert!((none.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((none.recall - 2.0 / 3.0).abs() < 1e-12);
        let xss = &r.per_class["xss"];
        assert!((xss.precision - 0.5).abs() < 1e-12);
        assert!((r.recall - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_binary_report() {
        let r = binary_report(&[true, true, false, false], &[true, false, true, false]);
        assert_eq!(r.precision, 0.5);
        assert_eq!(r.recall, 0.5);
        assert_eq!(r.f1, 0.5);

        let none = binary_report(&[false, false], &[false, false]);
        assert_eq!(none.f1, 0.0);
    }
}
