//! Fallback Threat Detection
//!
//! Keyword and heuristic rules used when no trained classifier is available.
//! Critical finding titles pick an attack category; forms combined with
//! suspicious scripts suggest phishing. The stronger signal wins.

use crate::logic::scan::{ScanData, SeverityLevel};

use super::recommendations::recommendation_list;
use super::rules::*;
use super::types::{DetectionMethod, ThreatCategory, ThreatDetail, ThreatResult};

/// Category suggested by critical finding titles, if any critical finding exists
pub fn critical_finding_category(scan: &ScanData) -> Option<ThreatCategory> {
    let titles: Vec<String> = scan
        .findings
        .iter()
        .filter(|f| f.level() == Some(SeverityLevel::Critical))
        .map(|f| f.title.to_lowercase())
        .collect();
    if titles.is_empty() {
        return None;
    }

    let matched = TITLE_KEYWORDS.iter().find(|(keywords, _)| {
        titles
            .iter()
            .any(|title| keywords.iter().any(|k| title.contains(k)))
    });
    Some(matched.map(|(_, c)| *c).unwrap_or(DEFAULT_CRITICAL_CATEGORY))
}

/// Phishing confidence when both forms and suspicious scripts are present
pub fn phishing_confidence(scan: &ScanData) -> Option<f64> {
    let content = &scan.content_analysis;
    let forms = content.form_count;
    let suspicious = content.suspicious_script_count;
    if forms > 0.0 && suspicious > 0.0 {
        Some(
            (PHISHING_BASE_CONFIDENCE + PHISHING_STEP * forms + PHISHING_STEP * suspicious)
                .min(PHISHING_CONFIDENCE_CAP),
        )
    } else {
        None
    }
}

/// Rule-based classification
pub fn fallback_detection(scan: &ScanData) -> ThreatResult {
    let mut result = ThreatResult::empty(DetectionMethod::Fallback);

    let mut primary = ThreatCategory::NoThreat;
    let mut confidence = 0.0;

    if let Some(category) = critical_finding_category(scan) {
        primary = category;
        confidence = CRITICAL_FINDING_CONFIDENCE;
    }
    if let Some(phishing) = phishing_confidence(scan) {
        if phishing > confidence {
            primary = ThreatCategory::Phishing;
            confidence = phishing;
        }
    }

    if primary.is_threat() {
        result.primary_threat_type = primary;
        result.threat_confidence = confidence;
        result.threat_details.insert(primary, ThreatDetail::new(confidence));
        result.threat_detected = confidence >= DETECTION_THRESHOLD;
        if result.threat_detected {
            result.recommendations = Some(recommendation_list(primary));
        }
    }

    log::debug!(
        "Fallback threat detection: {} ({:.2}, detected={})",
        result.primary_threat_type,
        result.threat_confidence,
        result.threat_detected
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scan::fixtures::{clean_scan, sql_injection_scan};
    use crate::logic::scan::Finding;

    fn critical(title: &str) -> ScanData {
        ScanData {
            findings: vec![Finding::new("Critical", title)],
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_scan_is_none() {
        let result = fallback_detection(&clean_scan());
        assert!(!result.threat_detected);
        assert_eq!(result.primary_threat_type, ThreatCategory::NoThreat);
        assert_eq!(result.threat_confidence, 0.0);
        assert!(result.recommendations.is_none());
        assert_eq!(result.threat_details.len(), 9);
    }

    #[test]
    fn test_sql_keyword_wins() {
        let result = fallback_detection(&sql_injection_scan());
        assert!(result.threat_detected);
        assert_eq!(result.primary_threat_type, ThreatCategory::SqlInjection);
        assert_eq!(result.threat_confidence, 0.8);
        assert_eq!(result.threat_details[&ThreatCategory::SqlInjection].severity, SeverityLevel::Critical);
        assert_eq!(result.recommendations.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_keyword_order() {
        assert_eq!(critical_finding_category(&critical("Reflected XSS")), Some(ThreatCategory::Xss));
        assert_eq!(
            critical_finding_category(&critical("Open redirect via next=")),
            Some(ThreatCategory::OpenRedirect)
        );
        assert_eq!(
            critical_finding_category(&critical("OS command injection")),
            Some(ThreatCategory::CommandInjection)
        );
        assert_eq!(
            critical_finding_category(&critical("Unsafe deserialize of cookie")),
            Some(ThreatCategory::InsecureDeserialization)
        );
        assert_eq!(critical_finding_category(&critical("Backdoor found")), Some(ThreatCategory::Malware));
        // "sql" outranks "injection"
        assert_eq!(
            critical_finding_category(&critical("SQL injection")),
            Some(ThreatCategory::SqlInjection)
        );
    }

    #[test]
    fn test_non_critical_findings_ignored() {
        let scan = ScanData {
            findings: vec![Finding::new("High", "SQL injection")],
            ..Default::default()
        };
        assert_eq!(critical_finding_category(&scan), None);
    }

    #[test]
    fn test_phishing_signal() {
        let mut scan = ScanData::default();
        scan.content_analysis.form_count = 2.0;
        scan.content_analysis.suspicious_script_count = 3.0;
        let result = fallback_detection(&scan);
        assert_eq!(result.primary_threat_type, ThreatCategory::Phishing);
        assert!((result.threat_confidence - 0.7).abs() < 1e-12);
        assert!(result.threat_detected);

        // Weak phishing signal stays below the detection threshold
        scan.content_analysis.form_count = 1.0;
        scan.content_analysis.suspicious_script_count = 1.0;
        let result = fallback_detection(&scan);
        assert_eq!(result.primary_threat_type, ThreatCategory::Phishing);
        assert!(!result.threat_detected);
        assert!(result.recommendations.is_none());
    }

    #[test]
    fn test_winning_fallback_below_threshold_not_detected() {
        let mut scan = ScanData::default();
        scan.content_analysis.form_count = 1.0;
        scan.content_analysis.suspicious_script_count = 1.0;
        let result = fallback_detection(&scan);

        assert!((result.threat_confidence - 0.5).abs() < 1e-12);
        assert!(result.threat_confidence < DETECTION_THRESHOLD);
        assert_eq!(result.primary_threat_type, ThreatCategory::Phishing);
        assert!(result.threat_details[&ThreatCategory::Phishing].probability > 0.0);
        assert!(!result.threat_detected);
    }

    #[test]
    fn test_critical_finding_beats_phishing() {
        let mut scan = critical("Remote code execution");
        scan.content_analysis.form_count = 5.0;
        scan.content_analysis.suspicious_script_count = 5.0;
        let result = fallback_detection(&scan);
        assert_eq!(result.primary_threat_type, ThreatCategory::Malware);
        assert_eq!(result.threat_confidence, 0.8);
    }
}
