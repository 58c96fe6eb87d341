//! Risk Module - 0 - 100 risk score with a six-category breakdown
//!
//! Two paths, same output record:
//! - rule-based: deterministic category formulas, always available
//! - model-based: gradient-boosted prediction of the overall score; the
//!   category breakdown is still rule-derived
//!
//! ## Structure
//! - `types`: RiskCategory, RiskLevel, RiskResult
//! - `rules`: weights and formula constants
//! - `rule_based`: category formulas + weighted sum
//! - `scorer`: model path and `score_risk` orchestration
//! - `importance`: feature importance report for the trained regressor

pub mod types;
pub mod rules;
pub mod rule_based;
pub mod scorer;
pub mod importance;


pub use types::{CategoryScore, RiskCategory, RiskLevel, RiskResult, ScoringMethod};

pub use rule_based::{category_score, category_scores, rule_based_score};

pub use scorer::{model_based_score, score_risk};

pub use importance::{analyze_feature_importance, FeatureImportance, ImportanceReport};
