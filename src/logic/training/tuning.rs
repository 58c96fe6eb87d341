//! Hyperparameter Tuning
//!
//! Exhaustive grid search scored by k-fold cross-validation on the
//! (already scaled) training split.

use ndarray::ArrayView2;

use crate::logic::model::metrics::{classification_report, mean_squared_error};
use crate::logic::model::{
    GradientBoostingParams, GradientBoostingRegressor, RandomForestClassifier, RandomForestParams,
};

use super::dataset::{k_fold, select, select_rows, Split};
use super::hyperparams::{risk_param_grid, threat_param_grid, CV_FOLDS};

/// Candidate with the highest mean fold score (first wins on ties)
pub fn grid_search<P: Clone + std::fmt::Debug>(
    candidates: &[P],
    folds: &[Split],
    mut score: impl FnMut(&P, &Split) -> f64,
) -> Option<(P, f64)> {
    let mut best: Option<(P, f64)> = None;
    for candidate in candidates {
        let total: f64 = folds.iter().map(|fold| score(candidate, fold)).sum();
        let mean = total / folds.len().max(1) as f64;
        log::debug!("Grid candidate {:?}: cv score {:.4}", candidate, mean);
        if best.as_ref().map_or(true, |(_, b)| mean > *b) {
            best = Some((candidate.clone(), mean));
        }
    }
    best
}

/// Best regressor settings by mean squared error
pub fn tune_risk(x: ArrayView2<f64>, y: &[f64], seed: u64) -> GradientBoostingParams {
    let folds = k_fold(x.nrows(), CV_FOLDS, seed);
    let result = grid_search(&risk_param_grid(), &folds, |params, fold| {
        let model = GradientBoostingRegressor::fit(
            select_rows(x, &fold.train).view(),
            &select(y, &fold.train),
            *params,
            seed,
        );
        match model.predict(select_rows(x, &fold.test).view()) {
            Ok(pred) => -mean_squared_error(&select(y, &fold.test), &pred),
            Err(_) => f64::NEG_INFINITY,
        }
    });

    match result {
        Some((params, score)) => {
            log::info!("Best risk parameters: {:?} (cv mse {:.3})", params, -score);
            params
        }
        None => GradientBoostingParams::default(),
    }
}

/// Best classifier settings by weighted F1
pub fn tune_threat(x: ArrayView2<f64>, labels: &[usize], classes: &[String], seed: u64) -> RandomForestParams {
    let folds = k_fold(x.nrows(), CV_FOLDS, seed);
    let result = grid_search(&threat_param_grid(), &folds, |params, fold| {
        let model = RandomForestClassifier::fit(
            select_rows(x, &fold.train).view(),
            &select(labels, &fold.train),
            classes.to_vec(),
            *params,
            seed,
        );
        match model.predict(select_rows(x, &fold.test).view()) {
            Ok(pred) => classification_report(&select(labels, &fold.test), &pred, classes).f1,
            Err(_) => f64::NEG_INFINITY,
        }
    });

    match result {
        Some((params, score)) => {
            log::info!("Best threat parameters: {:?} (cv weighted f1 {:.3})", params, score);
            params
        }
        None => RandomForestParams::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_search_picks_highest_mean() {
        let folds = k_fold(6, 3, 0);
        let best = grid_search(&[1.0, 3.0, 2.0], &folds, |c, _| -(c - 2.5f64).abs()).unwrap();
        assert_eq!(best.0, 3.0);
        assert!(grid_search::<f64>(&[], &folds, |_, _| 0.0).is_none());
    }
}
