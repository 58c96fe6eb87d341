//! Threat Module
//!
//! Multi-class threat classification over the 22-feature threat layout.
//! A trained random forest is used when available; otherwise keyword and
//! heuristic rules take over.
//!
//! ## Structure
//! - `types`: ThreatCategory, ThreatDetail, ThreatResult
//! - `rules`: thresholds and fallback constants
//! - `recommendations`: remediation table per category
//! - `fallback`: rule-based detection
//! - `classifier`: model path + orchestration
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threat::classify_threat;
//!
//! let result = classify_threat(&scan, &models);
//! if result.threat_detected {
//!     println!("{} ({:.2})", result.primary_threat_type, result.threat_confidence);
//! }
//! ```

pub mod types;
pub mod rules;
pub mod recommendations;
pub mod fallback;
pub mod classifier;

pub use types::{DetectionMethod, ThreatCategory, ThreatDetail, ThreatResult};

pub use rules::DETECTION_THRESHOLD;

pub use recommendations::{recommendation_list, recommendations};

pub use fallback::fallback_detection;

pub use classifier::{classify_threat, model_based_classification};
