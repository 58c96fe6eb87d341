//! Threat Classification Rules & Thresholds
//!
//! Constants only. Classification logic lives in `classifier` / `fallback`.

use super::types::ThreatCategory;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Primary threat probability at or above this = detected.
///
/// Applies to the model and the fallback path alike. A fallback phishing
/// signal that wins with a confidence below it (e.g. 0.5 from one form and
/// one suspicious script) is reported as the primary type but not as
/// detected; older callers that flagged any winning fallback signal will
/// see `threat_detected == false` there.
pub const DETECTION_THRESHOLD: f64 = 0.6;

// ============================================================================
// FALLBACK HEURISTICS
// ============================================================================

/// Confidence assigned when any critical finding is present
pub const CRITICAL_FINDING_CONFIDENCE: f64 = 0.8;

/// Phishing: `min(CAP, BASE + STEP·forms + STEP·suspicious_scripts)`
pub const PHISHING_BASE_CONFIDENCE: f64 = 0.3;
pub const PHISHING_STEP: f64 = 0.1;
pub const PHISHING_CONFIDENCE_CAP: f64 = 0.7;

/// Title keywords checked in order against critical findings (lowercased).
/// The first keyword group with a hit decides the category.
pub const TITLE_KEYWORDS: &[(&[&str], ThreatCategory)] = &[
    (&["sql"], ThreatCategory::SqlInjection),
    (&["xss"], ThreatCategory::Xss),
    (&["csrf"], ThreatCategory::Csrf),
    (&["redirect"], ThreatCategory::OpenRedirect),
    (&["injection"], ThreatCategory::CommandInjection),
    (&["serialize", "deserialize"], ThreatCategory::InsecureDeserialization),
];

/// Category when critical findings match no keyword
pub const DEFAULT_CRITICAL_CATEGORY: ThreatCategory = ThreatCategory::Malware;
