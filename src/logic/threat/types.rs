//! Threat Types
//!
//! Core types for threat classification.
//! No logic here - data structures only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::scan::SeverityLevel;

// ============================================================================
// THREAT CATEGORY
// ============================================================================

/// Classifier output classes: eight attack types plus "none"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    Malware,
    Phishing,
    CommandInjection,
    SqlInjection,
    Xss,
    Csrf,
    OpenRedirect,
    InsecureDeserialization,
    /// No threat
    #[serde(rename = "none")]
    NoThreat,
}

impl ThreatCategory {
    /// Canonical class order (synthetic labels, result details)
    pub const ALL: [ThreatCategory; 9] = [
        ThreatCategory::Malware,
        ThreatCategory::Phishing,
        ThreatCategory::CommandInjection,
        ThreatCategory::SqlInjection,
        ThreatCategory::Xss,
        ThreatCategory::Csrf,
        ThreatCategory::OpenRedirect,
        ThreatCategory::InsecureDeserialization,
        ThreatCategory::NoThreat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Malware => "malware",
            ThreatCategory::Phishing => "phishing",
            ThreatCategory::CommandInjection => "command_injection",
            ThreatCategory::SqlInjection => "sql_injection",
            ThreatCategory::Xss => "xss",
            ThreatCategory::Csrf => "csrf",
            ThreatCategory::OpenRedirect => "open_redirect",
            ThreatCategory::InsecureDeserialization => "insecure_deserialization",
            ThreatCategory::NoThreat => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn is_threat(&self) -> bool {
        *self != ThreatCategory::NoThreat
    }

    /// Class names in canonical order
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Trained classifier
    Model,
    /// Keyword / heuristic rules
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatDetail {
    /// 0 - 1
    pub probability: f64,
    pub severity: SeverityLevel,
}

impl ThreatDetail {
    pub fn new(probability: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            probability,
            severity: SeverityLevel::from_probability(probability),
        }
    }
}

/// Output of `classify_threat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatResult {
    pub threat_detected: bool,
    pub primary_threat_type: ThreatCategory,
    /// 0 - 1
    pub threat_confidence: f64,
    /// One entry per category
    pub threat_details: BTreeMap<ThreatCategory, ThreatDetail>,
    /// Present only when a threat was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    pub detection_method: DetectionMethod,
}

impl ThreatResult {
    /// Nothing detected, every category at probability 0
    pub fn empty(method: DetectionMethod) -> Self {
        Self {
            threat_detected: false,
            primary_threat_type: ThreatCategory::NoThreat,
            threat_confidence: 0.0,
            threat_details: ThreatCategory::ALL
                .into_iter()
                .map(|c| (c, ThreatDetail::new(0.0)))
                .collect(),
            recommendations: None,
            detection_method: method,
        }
    }

    pub fn probability(&self, category: ThreatCategory) -> f64 {
        self.threat_details
            .get(&category)
            .map(|d| d.probability)
            .unwrap_or(0.0)
    }
}
