//! Random Forest Classifier
//!
//! Bagged Gini trees with `sqrt(n_features)` candidates per split. Bootstrap
//! draws become per-sample weights, multiplied by the class weights.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::error::ModelError;

use super::tree::{normalize, DecisionTree, TreeParams, TreeTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1
    Uniform,
    /// `n_samples / (n_classes * n_samples_of_class)`
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub params: RandomForestParams,
    /// Class names, index-aligned with the probability vectors
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
    pub n_features: usize,
    pub feature_importances: Vec<f64>,
}

/// Per-class weights for `labels`
pub fn class_weights(labels: &[usize], n_classes: usize, mode: ClassWeight) -> Vec<f64> {
    match mode {
        ClassWeight::Uniform => vec![1.0; n_classes],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; n_classes];
            for &l in labels {
                counts[l] += 1;
            }
            let present = counts.iter().filter(|&&c| c > 0).count().max(1);
            counts
                .iter()
                .map(|&c| {
                    if c > 0 {
                        labels.len() as f64 / (present as f64 * c as f64)
                    } else {
                        0.0
                    }
                })
                .collect()
        }
    }
}

impl RandomForestClassifier {
    /// `labels[i]` indexes into `classes`
    pub fn fit(
        x: ArrayView2<f64>,
        labels: &[usize],
        classes: Vec<String>,
        params: RandomForestParams,
        seed: u64,
    ) -> Self {
        let n = x.nrows();
        let n_features = x.ncols();
        let n_classes = classes.len();
        let mut rng = StdRng::seed_from_u64(seed);

        let per_class = class_weights(labels, n_classes, params.class_weight);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: Some(((n_features as f64).sqrt() as usize).max(1)),
        };
        let target = TreeTarget::Classification { labels, n_classes };

        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut importance_sum = vec![0.0; n_features];
        let mut weights = vec![0.0; n];

        for _ in 0..params.n_estimators {
            let tree_seed: u64 = rng.gen();
            let mut tree_rng = StdRng::seed_from_u64(tree_seed);

            if params.bootstrap && n > 0 {
                weights.iter_mut().for_each(|w| *w = 0.0);
                for _ in 0..n {
                    weights[tree_rng.gen_range(0..n)] += 1.0;
                }
            } else {
                weights.iter_mut().for_each(|w| *w = 1.0);
            }
            for (w, &l) in weights.iter_mut().zip(labels) {
                *w *= per_class[l];
            }

            let tree = DecisionTree::fit(x, &target, &weights, &tree_params, &mut tree_rng);
            for (acc, v) in importance_sum.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
            trees.push(tree);
        }

        Self {
            params,
            classes,
            trees,
            n_features,
            feature_importances: normalize(&importance_sum),
        }
    }

    /// Mean of the per-tree class distributions for one (scaled) sample
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureShape {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted("random forest"));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(row).ok_or(ModelError::NotFitted("random forest tree"))?;
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (p, v) in proba.iter_mut().zip(leaf) {
                    *p += v / total;
                }
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }

    /// Index of the most probable class (first on ties)
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<usize, ModelError> {
        let proba = self.predict_proba_row(row)?;
        Ok(argmax(&proba))
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ModelError> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn blobs() -> (Array2<f64>, Vec<usize>) {
        // Three well separated clusters on a 4-feature grid
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for class in 0..3usize {
            for k in 0..12 {
                let base = class as f64 * 10.0;
                let jitter = (k % 4) as f64 * 0.3;
                rows.extend([base + jitter, base - jitter, (k % 2) as f64, jitter]);
                labels.push(class);
            }
        }
        (Array2::from_shape_vec((36, 4), rows).unwrap(), labels)
    }

    fn names() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_separable_classes_are_learned() {
        let (x, y) = blobs();
        let params = RandomForestParams {
            n_estimators: 15,
            ..Default::default()
        };
        let model = RandomForestClassifier::fit(x.view(), &y, names(), params, 42);
        let pred = model.predict(x.view()).unwrap();
        assert_eq!(pred, y);

        let proba = model.predict_proba_row(x.row(0)).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[0] > 0.5);
    }

    #[test]
    fn test_balanced_weights() {
        let labels = [0, 0, 0, 1];
        let w = class_weights(&labels, 2, ClassWeight::Balanced);
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((w[1] - 2.0).abs() < 1e-12);
        assert_eq!(class_weights(&labels, 2, ClassWeight::Uniform), vec![1.0, 1.0]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = blobs();
        let params = RandomForestParams {
            n_estimators: 5,
            ..Default::default()
        };
        let a = RandomForestClassifier::fit(x.view(), &y, names(), params, 9);
        let b = RandomForestClassifier::fit(x.view(), &y, names(), params, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
