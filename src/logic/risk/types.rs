//! Risk Types
//!
//! Result records of the risk scorer. No scoring logic here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{
    COMPLIANCE_WEIGHT, CONFIGURATION_WEIGHT, CONTENT_WEIGHT, EXPOSURE_WEIGHT, REPUTATION_WEIGHT,
    VULNERABILITY_WEIGHT,
};

// ============================================================================
// RISK CATEGORY
// ============================================================================

/// The six independently scored risk categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Vulnerability,
    Compliance,
    Exposure,
    Configuration,
    Content,
    Reputation,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 6] = [
        RiskCategory::Vulnerability,
        RiskCategory::Compliance,
        RiskCategory::Exposure,
        RiskCategory::Configuration,
        RiskCategory::Content,
        RiskCategory::Reputation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Vulnerability => "vulnerability",
            RiskCategory::Compliance => "compliance",
            RiskCategory::Exposure => "exposure",
            RiskCategory::Configuration => "configuration",
            RiskCategory::Content => "content",
            RiskCategory::Reputation => "reputation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Contribution to the overall score. The six weights sum to 1.
    pub fn weight(&self) -> f64 {
        match self {
            RiskCategory::Vulnerability => VULNERABILITY_WEIGHT,
            RiskCategory::Compliance => COMPLIANCE_WEIGHT,
            RiskCategory::Exposure => EXPOSURE_WEIGHT,
            RiskCategory::Configuration => CONFIGURATION_WEIGHT,
            RiskCategory::Content => CONTENT_WEIGHT,
            RiskCategory::Reputation => REPUTATION_WEIGHT,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskCategory::Vulnerability => "Security vulnerabilities and weaknesses",
            RiskCategory::Compliance => "Adherence to security standards and best practices",
            RiskCategory::Exposure => "Internet exposure and attack surface area",
            RiskCategory::Configuration => "Server and application configuration security",
            RiskCategory::Content => "Website content security issues",
            RiskCategory::Reputation => "Domain reputation and history",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Bucketed overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `[0,20)` Low, `[20,40)` Moderate, `[40,60)` Medium, `[60,80)` High,
    /// `[80,101)` Critical. Anything outside the table is Critical.
    pub fn from_score(score: f64) -> Self {
        if (0.0..20.0).contains(&score) {
            RiskLevel::Low
        } else if (20.0..40.0).contains(&score) {
            RiskLevel::Moderate
        } else if (40.0..60.0).contains(&score) {
            RiskLevel::Medium
        } else if (60.0..80.0).contains(&score) {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#4CAF50",      // Green
            RiskLevel::Moderate => "#FFC107", // Amber
            RiskLevel::Medium => "#FF9800",   // Orange
            RiskLevel::High => "#F44336",     // Red
            RiskLevel::Critical => "#9C27B0", // Purple
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    RuleBased,
    MachineLearning,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::RuleBased => "rule_based",
            ScoringMethod::MachineLearning => "machine_learning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// 0 - 100
    pub score: f64,
    pub weight: f64,
    pub description: String,
}

/// Output of `score_risk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// 0 - 100, one decimal
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: String,
    pub category_scores: BTreeMap<RiskCategory, CategoryScore>,
    pub scoring_method: ScoringMethod,
}

impl RiskResult {
    /// Assemble a result; the level is taken from the rounded score
    pub fn new(
        overall: f64,
        category_scores: BTreeMap<RiskCategory, CategoryScore>,
        scoring_method: ScoringMethod,
    ) -> Self {
        let overall_score = round1(overall.clamp(0.0, 100.0));
        let risk_level = RiskLevel::from_score(overall_score);
        Self {
            overall_score,
            risk_level,
            risk_color: risk_level.color().to_string(),
            category_scores,
            scoring_method,
        }
    }

    /// Σ score × weight over the category breakdown
    pub fn weighted_category_sum(&self) -> f64 {
        self.category_scores
            .values()
            .map(|c| c.score * c.weight)
            .sum()
    }
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
