//! Anomaly Module - binary outlier detection over the 12 anomaly features
//!
//! ## Structure
//! - `detector`: isolation-forest scoring and the fail-safe `detect_anomaly`

pub mod detector;

pub use detector::{anomaly_score, detect_anomaly, model_based_detection};
