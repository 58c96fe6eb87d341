//! Risk Scoring Rules & Weights
//!
//! Constants only. The category formulas live in `rule_based`.

// ============================================================================
// CATEGORY WEIGHTS (sum to 1.0)
// ============================================================================

pub const VULNERABILITY_WEIGHT: f64 = 0.30;
pub const COMPLIANCE_WEIGHT: f64 = 0.20;
pub const EXPOSURE_WEIGHT: f64 = 0.15;
pub const CONFIGURATION_WEIGHT: f64 = 0.15;
pub const CONTENT_WEIGHT: f64 = 0.10;
pub const REPUTATION_WEIGHT: f64 = 0.10;

// ============================================================================
// COMPLIANCE
// ============================================================================

pub const COMPLIANCE_HEADER_SHARE: f64 = 0.3;
pub const COMPLIANCE_SSL_SHARE: f64 = 0.5;
pub const COMPLIANCE_OTHER_SHARE: f64 = 0.2;

pub const INVALID_SSL_PENALTY: f64 = 50.0;
pub const SSL_VULNERABILITY_PENALTY: f64 = 10.0;
pub const SSL_VULNERABILITY_PENALTY_CAP: f64 = 50.0;

// ============================================================================
// EXPOSURE
// ============================================================================

pub const OPEN_PORT_POINTS: f64 = 10.0;
pub const VERSION_DISCLOSED_POINTS: f64 = 30.0;
pub const EXPOSED_SERVICE_POINTS: f64 = 20.0;

pub const EXPOSURE_PORT_SHARE: f64 = 0.4;
pub const EXPOSURE_DISCLOSURE_SHARE: f64 = 0.3;
pub const EXPOSURE_SERVICE_SHARE: f64 = 0.3;

// ============================================================================
// CONFIGURATION
// ============================================================================

pub const OUTDATED_SERVER_POINTS: f64 = 40.0;
pub const NO_PFS_POINTS: f64 = 30.0;
pub const EXPIRING_SSL_POINTS: f64 = 20.0;
/// Certificates valid for fewer days than this count as expiring
pub const EXPIRING_SSL_DAYS: f64 = 30.0;
pub const MISCONFIGURATION_POINTS: f64 = 10.0;
pub const MISCONFIGURATION_CAP: f64 = 30.0;

// ============================================================================
// CONTENT
// ============================================================================

pub const EXTERNAL_SCRIPT_POINTS: f64 = 8.0;
pub const EXTERNAL_SCRIPT_CAP: f64 = 40.0;
pub const LOGIN_FORM_POINTS: f64 = 30.0;
pub const IFRAME_POINTS: f64 = 10.0;
pub const IFRAME_CAP: f64 = 20.0;

// ============================================================================
// REPUTATION
// ============================================================================

pub const BLACKLIST_POINTS: f64 = 50.0;
pub const MALWARE_HISTORY_POINTS: f64 = 30.0;
pub const PHISHING_HISTORY_POINTS: f64 = 30.0;

/// Upper bound of every category score and of the overall score
pub const MAX_SCORE: f64 = 100.0;
