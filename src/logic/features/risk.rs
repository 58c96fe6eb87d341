//! Risk Features (31)

use crate::logic::scan::ScanData;

use super::layout::FeatureDomain;
use super::vector::{capped_ratio, flag, FeatureExtractor, FeatureVector};

pub struct RiskFeatures;

impl FeatureExtractor for RiskFeatures {
    const DOMAIN: FeatureDomain = FeatureDomain::Risk;

    fn write(scan: &ScanData, out: &mut Vec<f64>) {
        out.extend(scan.severity_counts().iter().map(|&c| c as f64));

        let ssl = &scan.ssl;
        out.extend([
            flag(ssl.is_valid),
            (ssl.days_to_expiry / 365.0).clamp(0.0, 1.0),
            ssl.cipher_strength / 256.0,
            flag(ssl.has_pfs),
            flag(ssl.vulnerabilities.is_empty()),
        ]);

        let h = &scan.headers;
        out.extend([
            flag(h.content_security_policy),
            flag(h.x_frame_options),
            flag(h.strict_transport_security),
            flag(h.x_content_type_options),
            flag(h.x_xss_protection),
            flag(h.referrer_policy),
            flag(h.permissions_policy),
        ]);

        let c = &scan.content_analysis;
        out.extend([
            capped_ratio(c.external_script_count, 10.0),
            capped_ratio(c.inline_script_count, 10.0),
            capped_ratio(c.form_count, 5.0),
            capped_ratio(c.input_field_count, 10.0),
            flag(c.has_login_form),
            capped_ratio(c.cookie_count, 5.0),
        ]);

        let s = &scan.server_info;
        out.extend([
            flag(s.version_disclosed),
            flag(s.is_outdated),
            s.open_port_count / 10.0,
            capped_ratio(s.vulnerability_count, 5.0),
        ]);

        let r = &scan.domain_reputation;
        out.extend([
            flag(r.is_blacklisted),
            flag(r.has_malware_history),
            flag(r.has_phishing_history),
            capped_ratio(r.risk_score, 100.0),
        ]);
    }
}

/// Extract the 31-feature risk vector
pub fn extract_risk_features(scan: &ScanData) -> FeatureVector {
    RiskFeatures::extract(scan)
}
