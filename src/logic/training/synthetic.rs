//! Synthetic Training Data
//!
//! Seeded generators used when no (or too little) labelled data is supplied.
//! The distributions are engineered to be separable; they carry no real-world
//! meaning beyond giving each family a sane starting model.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::logic::features::{
    ANOMALY_FEATURE_COUNT, RISK_FEATURE_COUNT, THREAT_BINARY_FEATURES, THREAT_FEATURE_COUNT,
};
use crate::logic::threat::ThreatCategory;

pub const SYNTHETIC_SAMPLES: usize = 1000;

/// Rows in the cold-start anomaly batch
pub const BOOTSTRAP_SAMPLES: usize = 100;

/// Share of anomalies in the synthetic anomaly set
pub const SYNTHETIC_ANOMALY_RATIO: f64 = 0.1;

// ============================================================================
// SAMPLING
// ============================================================================

/// One draw from `N(mean, std)`; an invalid std yields `mean`
pub fn normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    Normal::new(mean, std).map_or(mean, |dist| dist.sample(rng))
}

fn shuffled_order(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(rng);
    idx
}

// ============================================================================
// RISK
// ============================================================================

/// Relative weight of each risk feature in the synthetic target
fn risk_feature_weights() -> [f64; RISK_FEATURE_COUNT] {
    let mut w = [0.0; RISK_FEATURE_COUNT];
    w[0] = 5.0; // critical findings
    w[1] = 3.0; // high findings
    w[2] = 1.5; // medium findings
    w[5..10].iter_mut().for_each(|v| *v = 1.0); // ssl
    w[10..17].iter_mut().for_each(|v| *v = 0.8); // headers
    w[23..27].iter_mut().for_each(|v| *v = 2.0); // server
    w[27..31].iter_mut().for_each(|v| *v = 2.5); // reputation
    let total: f64 = w.iter().sum();
    w.iter_mut().for_each(|v| *v /= total);
    w
}

/// Uniform features; target `clip(20 + 60u + 100·Σ x·w + N(0, 5), 0, 100)`
pub fn risk_data(n: usize, seed: u64) -> (Array2<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, RISK_FEATURE_COUNT), |_| rng.gen::<f64>());
    let weights = risk_feature_weights();

    let y = x
        .rows()
        .into_iter()
        .map(|row| {
            let base = 20.0 + 60.0 * rng.gen::<f64>();
            let contribution: f64 = row.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>() * 100.0;
            let noise = normal(&mut rng, 0.0, 5.0);
            (base + contribution + noise).clamp(0.0, 100.0)
        })
        .collect();
    (x, y)
}

// ============================================================================
// THREAT
// ============================================================================

type Profile = ([f64; THREAT_FEATURE_COUNT], [f64; THREAT_FEATURE_COUNT]);

/// Per-class (mean, std) for each threat feature, in layout order
fn threat_profile(category: ThreatCategory) -> Profile {
    const S: f64 = 0.5;
    const T: f64 = 0.3;
    match category {
        ThreatCategory::Malware => (
            [3., 2., 1., 0., 10., 5., 10., 2., 3., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 3.],
            [1., 1., S, 0.2, 3., 2., 3., 1., 1., S, T, T, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::Phishing => (
            [1., 1., 0., 0., 5., 2., 8., 5., 1., 0., 0., 0., 0., 0., 1., 0., 0., 0., 0., 0., 0., 3.],
            [S, S, 0.2, 0.1, 2., 1., 3., 2., S, S, T, T, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::SqlInjection => (
            [2., 3., 1., 0., 3., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 1., 1., 1., 1., 0., 0., 4.],
            [1., 1., S, 0.2, 1., S, S, S, S, S, T, T, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::Xss => (
            [1., 2., 1., 0., 2., 4., 1., 0., 0., 0., 0., 1., 0., 0., 1., 1., 1., 1., 1., 0., 0., 3.],
            [S, 1., S, 0.2, 1., 2., 1., S, S, S, T, S, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::Csrf => (
            [0., 2., 1., 0., 1., 0., 3., 0., 0., 0., 0., 0., 1., 0., 1., 1., 1., 1., 1., 0., 0., 2.],
            [0.2, 1., S, 0.2, 1., S, 1., S, S, S, T, T, S, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::OpenRedirect => (
            [0., 1., 1., 0., 1., 0., 1., 4., 1., 0., 0., 0., 0., 1., 1., 1., 1., 1., 0., 0., 0., 4.],
            [0.2, S, S, 0.2, 1., S, 1., 2., S, S, T, T, T, S, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::CommandInjection => (
            [2., 2., 0., 0., 1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 3.],
            [1., 1., 0.2, 0.2, 1., S, S, S, S, S, T, T, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::InsecureDeserialization => (
            [1., 1., 0., 0., 2., 0., 0., 0., 0., 0., 0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 3.],
            [S, S, 0.2, 0.2, 1., S, S, S, S, S, T, T, T, T, S, S, S, S, S, S, S, 1.],
        ),
        ThreatCategory::NoThreat => (
            [0., 0., 1., 2., 5., 0., 1., 0., 0., 0., 1., 1., 1., 1., 1., 1., 1., 1., 1., 1., 1., 1.],
            [0.2, 0.2, S, 1., 2., S, S, S, S, S, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, S],
        ),
    }
}

/// `n / 9` samples per category, labels index `ThreatCategory::ALL`.
/// Counts are floored at 0 and flag columns rounded to {0, 1}.
pub fn threat_data(n: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let per_class = n / ThreatCategory::ALL.len();
    let total = per_class * ThreatCategory::ALL.len();

    let mut values = Vec::with_capacity(total * THREAT_FEATURE_COUNT);
    let mut labels = Vec::with_capacity(total);
    for (class, category) in ThreatCategory::ALL.into_iter().enumerate() {
        let (loc, scale) = threat_profile(category);
        for _ in 0..per_class {
            let mut row: Vec<f64> = loc
                .iter()
                .zip(&scale)
                .map(|(&m, &s)| normal(&mut rng, m, s).max(0.0))
                .collect();
            for &i in THREAT_BINARY_FEATURES {
                row[i] = row[i].clamp(0.0, 1.0).round();
            }
            values.extend(row);
            labels.push(class);
        }
    }

    let order = shuffled_order(total, &mut rng);
    let x = Array2::from_shape_vec((total, THREAT_FEATURE_COUNT), values)
        .unwrap_or_else(|_| Array2::zeros((0, THREAT_FEATURE_COUNT)));
    let x = x.select(ndarray::Axis(0), &order);
    let labels = order.iter().map(|&i| labels[i]).collect();
    (x, labels)
}

// ============================================================================
// ANOMALY
// ============================================================================

const NORMAL_MEANS: [f64; ANOMALY_FEATURE_COUNT] = [80., 85., 75., 90., 85., 0., 2., 5., 10., 20., 0.0, 0.05];
const NORMAL_STDS: [f64; ANOMALY_FEATURE_COUNT] = [10., 15., 10., 5., 10., 0.5, 1., 3., 5., 10., 0.01, 0.03];
const ANOMALY_MEANS: [f64; ANOMALY_FEATURE_COUNT] = [40., 30., 45., 50., 40., 5., 10., 15., 20., 10., 0.2, 0.5];
const ANOMALY_STDS: [f64; ANOMALY_FEATURE_COUNT] = [20., 15., 20., 25., 15., 3., 5., 7., 5., 5., 0.1, 0.2];

fn anomaly_row(rng: &mut StdRng, means: &[f64], stds: &[f64]) -> Vec<f64> {
    means
        .iter()
        .zip(stds)
        .enumerate()
        .map(|(i, (&m, &s))| {
            let v = normal(rng, m, s);
            match i {
                0..=4 => v.clamp(0.0, 100.0), // scores
                5..=9 => v.abs(),             // counts
                _ => v.clamp(0.0, 1.0),       // ratios
            }
        })
        .collect()
}

/// 90% normal / 10% anomalous rows, shuffled; labels are `is_anomaly`
pub fn anomaly_data(n: usize, seed: u64) -> (Array2<f64>, Vec<bool>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_normal = (n as f64 * (1.0 - SYNTHETIC_ANOMALY_RATIO)) as usize;

    let mut values = Vec::with_capacity(n * ANOMALY_FEATURE_COUNT);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let anomalous = i >= n_normal;
        let row = if anomalous {
            anomaly_row(&mut rng, &ANOMALY_MEANS, &ANOMALY_STDS)
        } else {
            anomaly_row(&mut rng, &NORMAL_MEANS, &NORMAL_STDS)
        };
        values.extend(row);
        labels.push(anomalous);
    }

    let order = shuffled_order(n, &mut rng);
    let x = Array2::from_shape_vec((n, ANOMALY_FEATURE_COUNT), values)
        .unwrap_or_else(|_| Array2::zeros((0, ANOMALY_FEATURE_COUNT)));
    let x = x.select(ndarray::Axis(0), &order);
    let labels = order.iter().map(|&i| labels[i]).collect();
    (x, labels)
}

/// Cold-start batch for the anomaly detector: uniform noise in [0, 1)
pub fn anomaly_bootstrap_data(seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((BOOTSTRAP_SAMPLES, ANOMALY_FEATURE_COUNT), |_| rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..20_000).map(|_| normal(&mut rng, 3.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!((mean - 3.0).abs() < 0.05, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.05, "std {}", var.sqrt());
    }

    #[test]
    fn test_normal_invalid_std_is_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(normal(&mut rng, 4.0, f64::NAN), 4.0);
        assert_eq!(normal(&mut rng, 4.0, 0.0), 4.0);
    }

    #[test]
    fn test_risk_data_shape_and_bounds() {
        let (x, y) = risk_data(200, 42);
        assert_eq!(x.dim(), (200, RISK_FEATURE_COUNT));
        assert!(y.iter().all(|v| (0.0..=100.0).contains(v)));
        assert!((risk_feature_weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_threat_data_balanced_and_binarised() {
        let (x, y) = threat_data(SYNTHETIC_SAMPLES, 42);
        assert_eq!(x.nrows(), 999);
        for class in 0..ThreatCategory::ALL.len() {
            assert_eq!(y.iter().filter(|&&l| l == class).count(), 111);
        }
        assert!(x.iter().all(|&v| v >= 0.0));
        for &i in THREAT_BINARY_FEATURES {
            assert!(x.column(i).iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn test_anomaly_data_split_and_ranges() {
        let (x, y) = anomaly_data(SYNTHETIC_SAMPLES, 42);
        assert_eq!(x.dim(), (1000, ANOMALY_FEATURE_COUNT));
        assert_eq!(y.iter().filter(|&&a| a).count(), 100);
        for row in x.rows() {
            assert!(row.iter().take(5).all(|v| (0.0..=100.0).contains(v)));
            assert!(row.iter().skip(10).all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_generators_are_seeded() {
        assert_eq!(risk_data(50, 1), risk_data(50, 1));
        assert_eq!(anomaly_bootstrap_data(42), anomaly_bootstrap_data(42));
        assert_ne!(anomaly_bootstrap_data(42), anomaly_bootstrap_data(43));
    }
}
