//! Integration Tests for Feature Extraction
//!
//! Extractors against the shared scan fixtures.

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{
        extract_anomaly_features, extract_risk_features, extract_threat_features, FeatureDomain,
    };
    use crate::logic::scan::fixtures::{high_risk_scan, sample_scan, sql_injection_scan};
    use crate::logic::scan::{Finding, ScanData};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_lengths_are_constant_for_any_input() {
        let inputs = [
            ScanData::default(),
            sample_scan(),
            high_risk_scan(),
            sql_injection_scan(),
        ];
        for scan in &inputs {
            assert_eq!(extract_risk_features(scan).len(), 31);
            assert_eq!(extract_threat_features(scan).len(), 22);
            assert_eq!(extract_anomaly_features(scan).len(), 12);
        }
    }

    #[test]
    fn test_empty_scan_is_all_defaults() {
        let v = extract_risk_features(&ScanData::default());
        // Only "ssl_no_vulnerabilities" is set for an empty record
        let set: Vec<&str> = v
            .feature_names()
            .iter()
            .zip(v.values.iter())
            .filter(|(_, &x)| x != 0.0)
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(set, vec!["ssl_no_vulnerabilities"]);
    }

    #[test]
    fn test_risk_features_sample() {
        let v = extract_risk_features(&sample_scan());
        assert_eq!(v.domain, FeatureDomain::Risk);
        assert_eq!(&v.values[0..5], &[0.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(v.get_by_name("ssl_valid"), Some(1.0));
        assert!((v.values[6] - 90.0 / 365.0).abs() < EPS);
        assert_eq!(v.get_by_name("ssl_cipher_strength"), Some(0.5));
        assert_eq!(&v.values[10..17], &[1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(v.get_by_name("external_script_count"), Some(0.2));
        assert_eq!(v.get_by_name("cookie_count"), Some(0.4));
        assert_eq!(v.get_by_name("open_port_count"), Some(0.2));
        assert_eq!(v.get_by_name("reputation_risk_score"), Some(0.05));
    }

    #[test]
    fn test_risk_features_clamping() {
        let v = extract_risk_features(&high_risk_scan());
        assert_eq!(v.get_by_name("ssl_no_vulnerabilities"), Some(0.0));
        assert_eq!(v.get_by_name("input_field_count"), Some(1.0));
        assert_eq!(v.get_by_name("cookie_count"), Some(1.0));
        assert_eq!(v.get_by_name("server_vulnerability_count"), Some(1.0));
        // Open ports are divided but never clamped
        assert_eq!(v.get_by_name("open_port_count"), Some(1.5));
    }

    #[test]
    fn test_risk_expiry_clamped_to_unit_interval() {
        let mut scan = ScanData::default();
        scan.ssl.days_to_expiry = 900.0;
        assert_eq!(extract_risk_features(&scan).get(6), Some(1.0));
        scan.ssl.days_to_expiry = -30.0;
        assert_eq!(extract_risk_features(&scan).get(6), Some(0.0));
    }

    #[test]
    fn test_unknown_severities_ignored() {
        let scan = ScanData {
            findings: vec![
                Finding::new("CRITICAL", "shouting"),
                Finding::new("Critical", "real"),
                Finding::new("", "blank"),
            ],
            ..Default::default()
        };
        let v = extract_threat_features(&scan);
        assert_eq!(&v.values[0..5], &[1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_threat_features_layout() {
        let mut scan = sql_injection_scan();
        scan.content_analysis.suspicious_script_count = 4.0;
        scan.content_analysis.cookie_count = 7.0;
        scan.url_info.path_depth = 3.0;
        scan.url_info.uses_https = true;
        let v = extract_threat_features(&scan);
        assert_eq!(v.get_by_name("critical_findings"), Some(3.0));
        assert_eq!(v.get_by_name("suspicious_script_count"), Some(4.0));
        assert_eq!(v.get_by_name("cookie_count"), Some(7.0));
        assert_eq!(v.get_by_name("ssl_valid"), Some(0.0));
        assert_eq!(v.get_by_name("ssl_no_vulnerabilities"), Some(1.0));
        assert_eq!(v.get_by_name("path_depth"), Some(3.0));
        assert_eq!(v.get_by_name("uses_https"), Some(1.0));
    }

    #[test]
    fn test_anomaly_ratios() {
        let v = extract_anomaly_features(&high_risk_scan());
        assert_eq!(&v.values[5..10], &[1.0, 2.0, 0.0, 0.0, 0.0]);
        assert!((v.values[10] - 1.0 / 3.0).abs() < EPS);
        assert!((v.values[11] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_anomaly_ratios_zero_without_findings() {
        let mut scan = ScanData::default();
        scan.summary.overall = 72.0;
        let v = extract_anomaly_features(&scan);
        assert_eq!(v.get(0), Some(72.0));
        assert_eq!(v.get(10), Some(0.0));
        assert_eq!(v.get(11), Some(0.0));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let scan = high_risk_scan();
        assert_eq!(extract_risk_features(&scan), extract_risk_features(&scan));
        assert_eq!(extract_threat_features(&scan), extract_threat_features(&scan));
    }
}
