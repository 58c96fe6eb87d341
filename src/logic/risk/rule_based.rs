//! Rule-Based Risk Scorer
//!
//! Deterministic, always-available path. Each category is an independent
//! formula over one part of the scan, bounded to 0 - 100; the overall score
//! is their weighted sum.

use std::collections::BTreeMap;

use crate::logic::scan::{ScanData, SeverityLevel};

use super::rules::*;
use super::types::{CategoryScore, RiskCategory, RiskResult, ScoringMethod};

// ============================================================================
// CATEGORY FORMULAS
// ============================================================================

/// Mean severity weight over all findings. A finding without a severity
/// counts as Low; an unrecognised severity counts with weight 0.
pub fn vulnerability_score(scan: &ScanData) -> f64 {
    if scan.findings.is_empty() {
        return 0.0;
    }
    let total: f64 = scan
        .findings
        .iter()
        .map(|f| match f.severity.as_deref() {
            None => SeverityLevel::Low.weight(),
            Some(s) => SeverityLevel::parse(s).map(|l| l.weight()).unwrap_or(0.0),
        })
        .sum();
    (total / scan.findings.len() as f64).min(MAX_SCORE)
}

/// `100 - (0.3·missing_headers% + 0.5·ssl_penalty + 0.2·other)`
pub fn compliance_score(scan: &ScanData) -> f64 {
    let required = scan.headers.required_flags();
    let missing = required.iter().filter(|present| !**present).count();
    let header_penalty = missing as f64 / required.len() as f64 * 100.0;

    let ssl = &scan.ssl;
    let mut ssl_penalty = 0.0;
    if !ssl.is_valid {
        ssl_penalty += INVALID_SSL_PENALTY;
    }
    ssl_penalty += (ssl.vulnerabilities.len() as f64 * SSL_VULNERABILITY_PENALTY)
        .min(SSL_VULNERABILITY_PENALTY_CAP);

    // No other compliance factors are tracked yet
    let other_penalty = 0.0;

    (MAX_SCORE
        - (COMPLIANCE_HEADER_SHARE * header_penalty
            + COMPLIANCE_SSL_SHARE * ssl_penalty
            + COMPLIANCE_OTHER_SHARE * other_penalty))
        .clamp(0.0, MAX_SCORE)
}

pub fn exposure_score(scan: &ScanData) -> f64 {
    let server = &scan.server_info;
    let ports = (server.open_port_count * OPEN_PORT_POINTS).clamp(0.0, MAX_SCORE);
    let disclosure = if server.version_disclosed {
        VERSION_DISCLOSED_POINTS
    } else {
        0.0
    };
    let services = (server.exposed_services.len() as f64 * EXPOSED_SERVICE_POINTS).min(MAX_SCORE);

    EXPOSURE_PORT_SHARE * ports + EXPOSURE_DISCLOSURE_SHARE * disclosure + EXPOSURE_SERVICE_SHARE * services
}

pub fn configuration_score(scan: &ScanData) -> f64 {
    let mut score = 0.0;
    if scan.server_info.is_outdated {
        score += OUTDATED_SERVER_POINTS;
    }
    if !scan.ssl.has_pfs {
        score += NO_PFS_POINTS;
    }
    if scan.ssl.is_valid && scan.ssl.days_to_expiry < EXPIRING_SSL_DAYS {
        score += EXPIRING_SSL_POINTS;
    }
    score += (scan.misconfigurations.len() as f64 * MISCONFIGURATION_POINTS).min(MISCONFIGURATION_CAP);
    score.min(MAX_SCORE)
}

pub fn content_score(scan: &ScanData) -> f64 {
    let content = &scan.content_analysis;
    let mut score = (content.external_script_count * EXTERNAL_SCRIPT_POINTS).clamp(0.0, EXTERNAL_SCRIPT_CAP);
    if content.has_login_form {
        score += LOGIN_FORM_POINTS;
    }
    score += (content.iframe_count * IFRAME_POINTS).clamp(0.0, IFRAME_CAP);
    score.min(MAX_SCORE)
}

/// Reported risk score plus history penalties
pub fn reputation_score(scan: &ScanData) -> f64 {
    let rep = &scan.domain_reputation;
    let mut score = rep.risk_score;
    if rep.is_blacklisted {
        score += BLACKLIST_POINTS;
    }
    if rep.has_malware_history {
        score += MALWARE_HISTORY_POINTS;
    }
    if rep.has_phishing_history {
        score += PHISHING_HISTORY_POINTS;
    }
    score.clamp(0.0, MAX_SCORE)
}

pub fn category_score(category: RiskCategory, scan: &ScanData) -> f64 {
    match category {
        RiskCategory::Vulnerability => vulnerability_score(scan),
        RiskCategory::Compliance => compliance_score(scan),
        RiskCategory::Exposure => exposure_score(scan),
        RiskCategory::Configuration => configuration_score(scan),
        RiskCategory::Content => content_score(scan),
        RiskCategory::Reputation => reputation_score(scan),
    }
}

/// Full category breakdown with weights and descriptions
pub fn category_scores(scan: &ScanData) -> BTreeMap<RiskCategory, CategoryScore> {
    RiskCategory::ALL
        .into_iter()
        .map(|category| {
            (
                category,
                CategoryScore {
                    score: category_score(category, scan),
                    weight: category.weight(),
                    description: category.description().to_string(),
                },
            )
        })
        .collect()
}

// ============================================================================
// SCORER
// ============================================================================

/// Score a scan with the category formulas only
pub fn rule_based_score(scan: &ScanData) -> RiskResult {
    let categories = category_scores(scan);
    let overall: f64 = categories.values().map(|c| c.score * c.weight).sum();
    RiskResult::new(overall, categories, ScoringMethod::RuleBased)
}
