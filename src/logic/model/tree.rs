//! CART Decision Tree
//!
//! Shared tree learner for the boosted regressor (squared error) and the
//! random forest (Gini). Both criteria reduce to the same split proxy:
//! maximise `Σ_d S_L,d² / W_L + Σ_d S_R,d² / W_R`, where `S` are weighted
//! target sums (one dimension for regression, one-hot classes for Gini) and
//! `W` are node weights. The gain over the parent is the weighted impurity
//! decrease, which also feeds the feature importances.
//!
//! Sample weights carry both bootstrap counts and class weights.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split (`None` = all)
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Mean target (regression) or class distribution (classification)
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
    pub n_features: usize,
    /// Total weighted impurity decrease per feature (unnormalised)
    pub impurity_decrease: Vec<f64>,
}

/// What the tree is fitted against
pub enum TreeTarget<'a> {
    Regression(&'a [f64]),
    Classification { labels: &'a [usize], n_classes: usize },
}

impl TreeTarget<'_> {
    fn dims(&self) -> usize {
        match self {
            TreeTarget::Regression(_) => 1,
            TreeTarget::Classification { n_classes, .. } => *n_classes,
        }
    }

    fn accumulate(&self, i: usize, w: f64, sums: &mut [f64]) {
        match self {
            TreeTarget::Regression(y) => sums[0] += w * y[i],
            TreeTarget::Classification { labels, .. } => sums[labels[i]] += w,
        }
    }

    /// Squared target norm of sample `i`
    fn sq_norm(&self, i: usize) -> f64 {
        match self {
            TreeTarget::Regression(y) => y[i] * y[i],
            TreeTarget::Classification { .. } => 1.0,
        }
    }
}

// ============================================================================
// FIT
// ============================================================================

struct NodeStats {
    weight: f64,
    sums: Vec<f64>,
    sq: f64,
}

impl NodeStats {
    fn of(indices: &[usize], target: &TreeTarget, weights: &[f64]) -> Self {
        let mut sums = vec![0.0; target.dims()];
        let mut weight = 0.0;
        let mut sq = 0.0;
        for &i in indices {
            let w = weights[i];
            weight += w;
            sq += w * target.sq_norm(i);
            target.accumulate(i, w, &mut sums);
        }
        Self { weight, sums, sq }
    }

    fn proxy(&self) -> f64 {
        proxy(&self.sums, self.weight)
    }

    /// `W * impurity`
    fn weighted_impurity(&self) -> f64 {
        (self.sq - self.proxy()).max(0.0)
    }

    fn leaf_value(&self) -> Vec<f64> {
        if self.weight > 0.0 {
            self.sums.iter().map(|s| s / self.weight).collect()
        } else {
            vec![0.0; self.sums.len()]
        }
    }
}

fn proxy(sums: &[f64], weight: f64) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    sums.iter().map(|s| s * s).sum::<f64>() / weight
}

#[derive(Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a, 't, 'r> {
    x: ArrayView2<'a, f64>,
    target: &'t TreeTarget<'t>,
    weights: &'t [f64],
    params: TreeParams,
    rng: &'r mut StdRng,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl Builder<'_, '_, '_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let stats = NodeStats::of(&indices, self.target, self.weights);
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: stats.leaf_value(),
        });

        let n = indices.len();
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        let too_small = n < self.params.min_samples_split.max(2)
            || n < 2 * self.params.min_samples_leaf.max(1);
        let pure = stats.weighted_impurity() <= 1e-12 * stats.weight.max(1.0);
        if depth_reached || too_small || pure {
            return node_id;
        }

        let Some(split) = self.best_split(&indices, &stats) else {
            return node_id;
        };

        let x = self.x;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);

        self.importances[split.feature] += split.gain.max(0.0);
        let left_id = self.build(left, depth + 1);
        let right_id = self.build(right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }

    fn best_split(&mut self, indices: &[usize], stats: &NodeStats) -> Option<Split> {
        let x = self.x;
        let n = indices.len();
        let n_features = x.ncols();
        let max_features = self
            .params
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent = stats.proxy();

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut sorted = indices.to_vec();
        let mut left_sums = vec![0.0; stats.sums.len()];
        let mut best: Option<Split> = None;
        let mut visited = 0;

        for &f in &features {
            // Keep looking past the budget until one valid split exists
            if visited >= max_features && best.is_some() {
                break;
            }

            sorted.sort_by(|&a, &b| x[[a, f]].total_cmp(&x[[b, f]]));
            if x[[sorted[n - 1], f]] <= x[[sorted[0], f]] {
                continue;
            }
            visited += 1;

            left_sums.iter_mut().for_each(|s| *s = 0.0);
            let mut left_w = 0.0;

            for pos in 0..n - 1 {
                let i = sorted[pos];
                let w = self.weights[i];
                left_w += w;
                self.target.accumulate(i, w, &mut left_sums);

                let value = x[[i, f]];
                let next = x[[sorted[pos + 1], f]];
                if next <= value {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < min_leaf || n - n_left < min_leaf {
                    continue;
                }
                let right_w = stats.weight - left_w;
                if left_w <= 0.0 || right_w <= 0.0 {
                    continue;
                }

                let right_proxy = stats
                    .sums
                    .iter()
                    .zip(&left_sums)
                    .map(|(t, l)| (t - l).powi(2))
                    .sum::<f64>()
                    / right_w;
                let gain = proxy(&left_sums, left_w) + right_proxy - parent;

                if best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Split {
                        feature: f,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl DecisionTree {
    /// Fit on the rows of `x` whose weight is positive
    pub fn fit(
        x: ArrayView2<f64>,
        target: &TreeTarget,
        weights: &[f64],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.ncols();
        let indices: Vec<usize> = (0..x.nrows()).filter(|&i| weights[i] > 0.0).collect();

        let mut builder = Builder {
            x,
            target,
            weights,
            params: *params,
            rng,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        builder.build(indices, 0);

        Self {
            nodes: builder.nodes,
            n_features,
            impurity_decrease: builder.importances,
        }
    }

    /// Impurity decrease normalised to sum to 1 (all zeros for a stump)
    pub fn feature_importances(&self) -> Vec<f64> {
        normalize(&self.impurity_decrease)
    }

    /// Leaf value reached by `row`. `None` only for a malformed tree.
    pub fn leaf(&self, row: ArrayView1<f64>) -> Option<&[f64]> {
        let mut id = 0;
        // A well-formed tree never revisits a node
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(id)? {
                Node::Leaf { value } => return Some(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if *row.get(*feature)? <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes.get(id) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Scale to unit sum; all-zero input stays zero
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter().map(|v| v / total).collect()
    } else {
        values.to_vec()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_regression_step_function() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [10.0], [11.0], [12.0], [13.0]];
        let y = [1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0];
        let w = [1.0; 8];
        let mut rng = StdRng::seed_from_u64(42);
        let tree = DecisionTree::fit(
            x.view(),
            &TreeTarget::Regression(&y),
            &w,
            &TreeParams::default(),
            &mut rng,
        );

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf(array![2.5].view()), Some(&[1.0][..]));
        assert_eq!(tree.leaf(array![9.0].view()), Some(&[5.0][..]));
        match &tree.nodes[0] {
            Node::Split { threshold, .. } => assert_eq!(*threshold, 6.5),
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_classification_picks_informative_feature() {
        // Feature 1 separates the classes, feature 0 is noise
        let x = array![[5.0, 0.0], [1.0, 0.1], [3.0, 0.2], [2.0, 0.9], [4.0, 1.0], [0.0, 1.1]];
        let labels = [0, 0, 0, 1, 1, 1];
        let w = [1.0; 6];
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(
            x.view(),
            &TreeTarget::Classification { labels: &labels, n_classes: 2 },
            &w,
            &TreeParams::default(),
            &mut rng,
        );

        assert_eq!(tree.leaf(array![2.0, 0.05].view()), Some(&[1.0, 0.0][..]));
        assert_eq!(tree.leaf(array![2.0, 1.05].view()), Some(&[0.0, 1.0][..]));
        assert_eq!(tree.feature_importances(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_and_min_leaf_respected() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let y = [0.0, 1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0];
        let w = [1.0; 8];
        let params = TreeParams {
            max_depth: Some(2),
            min_samples_leaf: 2,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(x.view(), &TreeTarget::Regression(&y), &w, &params, &mut rng);

        assert!(tree.depth() <= 2);
        let leaves = tree.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count();
        assert!(leaves <= 4);
    }

    #[test]
    fn test_zero_weight_samples_ignored() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = [1.0, 1.0, 100.0];
        let w = [1.0, 1.0, 0.0];
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(
            x.view(),
            &TreeTarget::Regression(&y),
            &w,
            &TreeParams::default(),
            &mut rng,
        );
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.leaf(array![2.0].view()), Some(&[1.0][..]));
    }

    #[test]
    fn test_leaf_on_malformed_tree_is_none() {
        let tree = DecisionTree {
            nodes: vec![],
            n_features: 1,
            impurity_decrease: vec![0.0],
        };
        assert_eq!(tree.leaf(array![0.0].view()), None);
    }
}
