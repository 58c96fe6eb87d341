//! Threat Features (22)

use crate::logic::scan::ScanData;

use super::layout::FeatureDomain;
use super::vector::{flag, FeatureExtractor, FeatureVector};

pub struct ThreatFeatures;

impl FeatureExtractor for ThreatFeatures {
    const DOMAIN: FeatureDomain = FeatureDomain::Threat;

    fn write(scan: &ScanData, out: &mut Vec<f64>) {
        out.extend(scan.severity_counts().iter().map(|&c| c as f64));

        // Raw counts, scaled by the model's scaler
        let c = &scan.content_analysis;
        out.extend([
            c.suspicious_script_count,
            c.external_link_count,
            c.form_count,
            c.iframe_count,
            c.redirect_count,
            c.cookie_count,
        ]);

        let h = &scan.headers;
        out.extend([
            flag(h.content_security_policy),
            flag(h.x_frame_options),
            flag(h.strict_transport_security),
            flag(h.x_content_type_options),
            flag(h.x_xss_protection),
        ]);

        out.extend([
            flag(scan.ssl.is_valid),
            flag(scan.ssl.vulnerabilities.is_empty()),
        ]);

        let u = &scan.url_info;
        out.extend([
            u.subdomain_count,
            u.path_depth,
            u.query_param_count,
            flag(u.uses_https),
        ]);
    }
}

/// Extract the 22-feature threat vector
pub fn extract_threat_features(scan: &ScanData) -> FeatureVector {
    ThreatFeatures::extract(scan)
}
