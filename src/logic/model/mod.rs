//! Model Module - pure-Rust estimators
//!
//! Everything the three model families need: feature scaling, CART trees,
//! the ensembles built on them, and evaluation metrics. All fitting is seeded
//! so the same data and seed always give the same model.

pub mod gradient_boosting;
pub mod isolation_forest;
pub mod metrics;
pub mod random_forest;
pub mod scaler;
pub mod tree;

pub use gradient_boosting::{GradientBoostingParams, GradientBoostingRegressor};
pub use isolation_forest::{IsolationForest, IsolationForestParams, MaxSamples};
pub use metrics::{BinaryReport, ClassMetrics, ClassificationReport, RegressionReport};
pub use random_forest::{ClassWeight, RandomForestClassifier, RandomForestParams};
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeParams};
