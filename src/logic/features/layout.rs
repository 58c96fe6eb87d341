//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema of all three model families.**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment the domain's version
//! 2. Change order → increment the domain's version
//! 3. Remove feature → increment the domain's version
//!
//! Persisted models record the version and CRC32 hash of the layout they were
//! trained on; loading refuses artifacts whose layout differs.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// DOMAINS
// ============================================================================

/// Consumer of a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureDomain {
    Risk,
    Threat,
    Anomaly,
}

impl FeatureDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureDomain::Risk => "risk",
            FeatureDomain::Threat => "threat",
            FeatureDomain::Anomaly => "anomaly",
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        match self {
            FeatureDomain::Risk => RISK_FEATURE_LAYOUT,
            FeatureDomain::Threat => THREAT_FEATURE_LAYOUT,
            FeatureDomain::Anomaly => ANOMALY_FEATURE_LAYOUT,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            FeatureDomain::Risk => RISK_FEATURE_COUNT,
            FeatureDomain::Threat => THREAT_FEATURE_COUNT,
            FeatureDomain::Anomaly => ANOMALY_FEATURE_COUNT,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            FeatureDomain::Risk => RISK_FEATURE_VERSION,
            FeatureDomain::Threat => THREAT_FEATURE_VERSION,
            FeatureDomain::Anomaly => ANOMALY_FEATURE_VERSION,
        }
    }

    /// CRC32 over domain, version and ordered names
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(self.as_str().as_bytes());
        hasher.update(&[self.version()]);
        for name in self.names() {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize()
    }
}

impl std::fmt::Display for FeatureDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK LAYOUT (31)
// ============================================================================

pub const RISK_FEATURE_VERSION: u8 = 1;

pub const RISK_FEATURE_LAYOUT: &[&str] = &[
    // === Severity counts (0-4) ===
    "critical_findings",
    "high_findings",
    "medium_findings",
    "low_findings",
    "info_findings",

    // === SSL (5-9) ===
    "ssl_valid",
    "ssl_days_to_expiry",        // days / 365, clamped to 1
    "ssl_cipher_strength",       // bits / 256
    "ssl_pfs",
    "ssl_no_vulnerabilities",

    // === Headers (10-16) ===
    "has_csp",
    "has_x_frame_options",
    "has_hsts",
    "has_x_content_type",
    "has_xss_protection",
    "has_referrer_policy",
    "has_permissions_policy",

    // === Content (17-22) ===
    "external_script_count",     // / 10, clamped
    "inline_script_count",       // / 10, clamped
    "form_count",                // / 5, clamped
    "input_field_count",         // / 10, clamped
    "has_login_form",
    "cookie_count",              // / 5, clamped

    // === Server (23-26) ===
    "server_version_disclosed",
    "server_outdated",
    "open_port_count",           // / 10, NOT clamped
    "server_vulnerability_count", // / 5, clamped

    // === Reputation (27-30) ===
    "is_blacklisted",
    "has_malware_history",
    "has_phishing_history",
    "reputation_risk_score",     // / 100, clamped
];

pub const RISK_FEATURE_COUNT: usize = 31;

// ============================================================================
// THREAT LAYOUT (22)
// ============================================================================

pub const THREAT_FEATURE_VERSION: u8 = 1;

pub const THREAT_FEATURE_LAYOUT: &[&str] = &[
    // === Severity counts (0-4) ===
    "critical_findings",
    "high_findings",
    "medium_findings",
    "low_findings",
    "info_findings",

    // === Content, raw counts (5-10) ===
    "suspicious_script_count",
    "external_link_count",
    "form_count",
    "iframe_count",
    "redirect_count",
    "cookie_count",

    // === Headers (11-15) ===
    "has_csp",
    "has_x_frame_options",
    "has_hsts",
    "has_x_content_type",
    "has_xss_protection",

    // === SSL (16-17) ===
    // Expiry, cipher strength and PFS live in the risk layout only.
    "ssl_valid",
    "ssl_no_vulnerabilities",

    // === URL structure (18-21) ===
    "subdomain_count",
    "path_depth",
    "query_param_count",
    "uses_https",
];

pub const THREAT_FEATURE_COUNT: usize = 22;

/// Positions holding 0/1 flags
pub const THREAT_BINARY_FEATURES: &[usize] = &[11, 12, 13, 14, 15, 16, 17, 21];

// ============================================================================
// ANOMALY LAYOUT (12)
// ============================================================================

pub const ANOMALY_FEATURE_VERSION: u8 = 1;

pub const ANOMALY_FEATURE_LAYOUT: &[&str] = &[
    // === Scanner summary scores (0-4) ===
    "summary_overall",
    "summary_ssl",
    "summary_headers",
    "summary_vulnerabilities",
    "summary_server",

    // === Severity counts (5-9) ===
    "critical_findings",
    "high_findings",
    "medium_findings",
    "low_findings",
    "info_findings",

    // === Ratios (10-11), 0 when there are no findings ===
    "critical_ratio",
    "critical_high_ratio",
];

pub const ANOMALY_FEATURE_COUNT: usize = 12;

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub domain: FeatureDomain,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current(domain: FeatureDomain) -> Self {
        Self {
            domain,
            version: domain.version(),
            hash: domain.layout_hash(),
            feature_count: domain.count(),
            feature_names: domain.names().iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a recorded layout doesn't match the compiled one
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "Feature layout mismatch for {domain}: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub domain: FeatureDomain,
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that a recorded (version, hash) pair matches the current layout
pub fn validate_layout(
    domain: FeatureDomain,
    incoming_version: u8,
    incoming_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let current_hash = domain.layout_hash();

    if incoming_version != domain.version() || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            domain,
            expected_version: domain.version(),
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(domain: FeatureDomain, name: &str) -> Option<usize> {
    domain.names().iter().position(|&n| n == name)
}

pub fn feature_name(domain: FeatureDomain, index: usize) -> Option<&'static str> {
    domain.names().get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
