//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Every vector remembers which domain layout produced it, so a vector can
//! never be fed to a model trained on a different schema.

use serde::{Deserialize, Serialize};

use crate::logic::scan::ScanData;

use super::layout::{feature_index, validate_layout, FeatureDomain, LayoutMismatchError};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub domain: FeatureDomain,
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in layout order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Zeroed vector with the current layout of `domain`
    pub fn new(domain: FeatureDomain) -> Self {
        Self::from_values(domain, vec![0.0; domain.count()])
    }

    /// Create from raw values (truncates or zero-pads to the layout length)
    pub fn from_values(domain: FeatureDomain, mut values: Vec<f64>) -> Self {
        values.resize(domain.count(), 0.0);
        Self {
            domain,
            version: domain.version(),
            layout_hash: domain.layout_hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(self.domain, name).and_then(|i| self.get(i))
    }

    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        match feature_index(self.domain, name) {
            Some(index) => {
                self.set(index, value);
                true
            }
            None => false,
        }
    }

    /// Validate that this vector is compatible with the current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.domain, self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        self.domain.names()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "domain": self.domain.as_str(),
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": self.feature_names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// A pure, total mapping from a scan record to one domain's vector
pub trait FeatureExtractor {
    const DOMAIN: FeatureDomain;

    /// Write exactly `DOMAIN.count()` values in layout order
    fn write(scan: &ScanData, out: &mut Vec<f64>);

    fn extract(scan: &ScanData) -> FeatureVector {
        let mut values = Vec::with_capacity(Self::DOMAIN.count());
        Self::write(scan, &mut values);
        debug_assert_eq!(values.len(), Self::DOMAIN.count());
        FeatureVector::from_values(Self::DOMAIN, values)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub(crate) fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// `value / divisor`, capped at 1
pub(crate) fn capped_ratio(value: f64, divisor: f64) -> f64 {
    (value / divisor).min(1.0)
}
