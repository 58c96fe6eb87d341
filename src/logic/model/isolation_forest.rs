//! Isolation Forest
//!
//! Random isolation trees over sub-samples of ψ rows. Short average path
//! length means easy to isolate, i.e. anomalous:
//!
//! ```text
//! score(x) = 2^(-E[h(x)] / c(ψ))        c(n) = 2·H(n-1) - 2(n-1)/n
//! ```
//!
//! The decision threshold is the training-score percentile at
//! `1 - contamination`; a sample is anomalous iff its score is above it.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::error::ModelError;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Sub-sample size ceiling for `MaxSamples::Auto`
pub const AUTO_MAX_SAMPLES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxSamples {
    /// `min(256, n)`
    Auto,
    Count(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestParams {
    pub n_estimators: usize,
    pub max_samples: MaxSamples,
    pub contamination: f64,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: MaxSamples::Auto,
            contamination: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IsolationNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { size: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<IsolationNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    pub params: IsolationForestParams,
    pub trees: Vec<IsolationTree>,
    /// ψ, the per-tree sample size
    pub sample_size: usize,
    pub n_features: usize,
    /// Scores strictly above this are anomalous
    pub threshold: f64,
}

// ============================================================================
// PATH LENGTH
// ============================================================================

fn harmonic(i: f64) -> f64 {
    i.ln() + EULER_GAMMA
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * harmonic(n - 1.0) - 2.0 * (n - 1.0) / n
        }
    }
}

impl IsolationTree {
    fn fit(x: ArrayView2<f64>, sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, sample, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        x: ArrayView2<f64>,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(IsolationNode::Leaf { size: rows.len() });
        if rows.len() <= 1 || depth >= max_depth {
            return id;
        }

        // Features that still vary inside this node
        let varying: Vec<(usize, f64, f64)> = (0..x.ncols())
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    (lo.min(x[[r, f]]), hi.max(x[[r, f]]))
                });
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();
        if varying.is_empty() {
            return id;
        }

        let (feature, lo, hi) = varying[rng.gen_range(0..varying.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| x[[r, feature]] < threshold);

        let left_id = self.grow(x, left, depth + 1, max_depth, rng);
        let right_id = self.grow(x, right, depth + 1, max_depth, rng);
        self.nodes[id] = IsolationNode::Split {
            feature,
            threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    /// Depth reached by `row` plus the expected remaining depth of its leaf
    fn path_length(&self, row: ArrayView1<f64>) -> Option<f64> {
        let mut id = 0;
        let mut depth = 0.0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(id)? {
                IsolationNode::Leaf { size } => return Some(depth + average_path_length(*size)),
                IsolationNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if *row.get(*feature)? < *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
        None
    }
}

// ============================================================================
// FOREST
// ============================================================================

impl IsolationForest {
    pub fn fit(x: ArrayView2<f64>, params: IsolationForestParams, seed: u64) -> Self {
        let n = x.nrows();
        let sample_size = match params.max_samples {
            MaxSamples::Auto => n.min(AUTO_MAX_SAMPLES),
            MaxSamples::Count(k) => k.min(n),
        }
        .max(1);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let tree_seed: u64 = rng.gen();
                let mut tree_rng = StdRng::seed_from_u64(tree_seed);
                let sample = if n == 0 {
                    Vec::new()
                } else {
                    index::sample(&mut tree_rng, n, sample_size).into_vec()
                };
                IsolationTree::fit(x, sample, max_depth, &mut tree_rng)
            })
            .collect();

        let mut forest = Self {
            params,
            trees,
            sample_size,
            n_features: x.ncols(),
            threshold: f64::INFINITY,
        };

        let mut scores: Vec<f64> = x
            .rows()
            .into_iter()
            .filter_map(|row| forest.score_row(row).ok())
            .collect();
        forest.threshold = percentile(&mut scores, 100.0 * (1.0 - params.contamination));
        forest
    }

    /// Anomaly score in (0, 1]; higher is more anomalous
    pub fn score_row(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureShape {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted("isolation forest"));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree
                .path_length(row)
                .ok_or(ModelError::NotFitted("isolation tree"))?;
        }
        let mean = total / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        if norm <= 0.0 {
            return Ok(0.5);
        }
        Ok(2f64.powf(-mean / norm))
    }

    pub fn is_anomaly(&self, row: ArrayView1<f64>) -> Result<bool, ModelError> {
        Ok(self.score_row(row)? > self.threshold)
    }

    pub fn score(&self, x: ArrayView2<f64>) -> Result<Vec<f64>, ModelError> {
        x.rows().into_iter().map(|row| self.score_row(row)).collect()
    }
}

/// Linear-interpolated percentile (`q` in 0..=100). Sorts `values`.
pub fn percentile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (rank - lo as f64)
}
