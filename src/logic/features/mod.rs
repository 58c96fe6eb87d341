//! Features Module - Feature Extraction Engine
//!
//! Turns a `ScanData` record into a fixed-length, versioned vector per
//! scoring domain. Extraction is pure and total: missing groups read as
//! zero / false, unknown severities are skipped.
//!
//! ## Structure
//! - `layout`: name tables, versions and layout hashes (single source of truth)
//! - `vector`: `FeatureVector` and the `FeatureExtractor` trait
//! - `risk`, `threat`, `anomaly`: one extractor per domain

pub mod layout;
pub mod vector;
pub mod risk;
pub mod threat;
pub mod anomaly;

#[cfg(test)]
mod tests;

pub use layout::{
    feature_index, feature_name, validate_layout, FeatureDomain, LayoutInfo, LayoutMismatchError,
    ANOMALY_FEATURE_COUNT, RISK_FEATURE_COUNT, THREAT_BINARY_FEATURES, THREAT_FEATURE_COUNT,
};
pub use vector::{FeatureExtractor, FeatureVector};
pub use risk::{extract_risk_features, RiskFeatures};
pub use threat::{extract_threat_features, ThreatFeatures};
pub use anomaly::{extract_anomaly_features, AnomalyFeatures};
