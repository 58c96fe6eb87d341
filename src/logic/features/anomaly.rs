//! Anomaly Features (12)
//!
//! Severity counts come from `findings` only. Header and SSL groups are
//! presence/posture records here, not finding lists.

use crate::logic::scan::ScanData;

use super::layout::FeatureDomain;
use super::vector::{FeatureExtractor, FeatureVector};

pub struct AnomalyFeatures;

impl FeatureExtractor for AnomalyFeatures {
    const DOMAIN: FeatureDomain = FeatureDomain::Anomaly;

    fn write(scan: &ScanData, out: &mut Vec<f64>) {
        let s = &scan.summary;
        out.extend([s.overall, s.ssl, s.headers, s.vulnerabilities, s.server]);

        let counts = scan.severity_counts();
        out.extend(counts.iter().map(|&c| c as f64));

        let total: usize = counts.iter().sum();
        if total > 0 {
            let total = total as f64;
            out.push(counts[0] as f64 / total);
            out.push((counts[0] + counts[1]) as f64 / total);
        } else {
            out.extend([0.0, 0.0]);
        }
    }
}

/// Extract the 12-feature anomaly vector
pub fn extract_anomaly_features(scan: &ScanData) -> FeatureVector {
    AnomalyFeatures::extract(scan)
}
