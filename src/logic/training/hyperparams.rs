//! Training options and hyperparameter grids

use serde::{Deserialize, Serialize};

use crate::logic::model::{ClassWeight, GradientBoostingParams, RandomForestParams};

/// Share of samples held out for evaluation
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Folds used by grid search
pub const CV_FOLDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions<P> {
    /// Model hyperparameters (ignored when `tune` is set)
    pub params: P,
    /// Grid search with k-fold cross-validation before the final fit
    pub tune: bool,
    pub test_size: f64,
    /// Persist model, scaler and metrics after training
    pub save: bool,
}

impl<P: Default> Default for TrainOptions<P> {
    fn default() -> Self {
        Self {
            params: P::default(),
            tune: false,
            test_size: DEFAULT_TEST_SIZE,
            save: true,
        }
    }
}

impl<P: Default> TrainOptions<P> {
    /// Defaults without persisting
    pub fn in_memory() -> Self {
        Self {
            save: false,
            ..Default::default()
        }
    }

    pub fn with_params(params: P) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }
}

/// Candidate settings for the risk regressor
pub fn risk_param_grid() -> Vec<GradientBoostingParams> {
    let mut grid = Vec::new();
    for n_estimators in [50, 100] {
        for learning_rate in [0.05, 0.1, 0.2] {
            for max_depth in [2, 3, 4] {
                for subsample in [0.8, 1.0] {
                    grid.push(GradientBoostingParams {
                        n_estimators,
                        learning_rate,
                        max_depth,
                        subsample,
                        ..Default::default()
                    });
                }
            }
        }
    }
    grid
}

/// Candidate settings for the threat classifier
pub fn threat_param_grid() -> Vec<RandomForestParams> {
    let mut grid = Vec::new();
    for n_estimators in [50, 100] {
        for max_depth in [None, Some(10), Some(20)] {
            for min_samples_split in [2, 5] {
                for class_weight in [ClassWeight::Uniform, ClassWeight::Balanced] {
                    grid.push(RandomForestParams {
                        n_estimators,
                        max_depth,
                        min_samples_split,
                        class_weight,
                        ..Default::default()
                    });
                }
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grids_are_exhaustive() {
        assert_eq!(risk_param_grid().len(), 2 * 3 * 3 * 2);
        assert_eq!(threat_param_grid().len(), 2 * 3 * 2 * 2);
    }

    #[test]
    fn test_default_options() {
        let opts: TrainOptions<GradientBoostingParams> = TrainOptions::default();
        assert!(opts.save);
        assert!(!opts.tune);
        assert_eq!(opts.test_size, 0.2);
        assert!(!TrainOptions::<RandomForestParams>::in_memory().save);
    }
}
