//! Severity Levels
//!
//! Finding severities and their aggregation weights.

use serde::{Deserialize, Serialize};

/// Severity of a finding, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl SeverityLevel {
    /// Fixed order used by every severity-count feature block
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Critical,
        SeverityLevel::High,
        SeverityLevel::Medium,
        SeverityLevel::Low,
        SeverityLevel::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "Critical",
            SeverityLevel::High => "High",
            SeverityLevel::Medium => "Medium",
            SeverityLevel::Low => "Low",
            SeverityLevel::Info => "Info",
        }
    }

    /// Weight used by the vulnerability score
    pub fn weight(&self) -> f64 {
        match self {
            SeverityLevel::Critical => 100.0,
            SeverityLevel::High => 80.0,
            SeverityLevel::Medium => 50.0,
            SeverityLevel::Low => 20.0,
            SeverityLevel::Info => 0.0,
        }
    }

    /// Position in `ALL` (and in every severity-count block)
    pub fn index(&self) -> usize {
        match self {
            SeverityLevel::Critical => 0,
            SeverityLevel::High => 1,
            SeverityLevel::Medium => 2,
            SeverityLevel::Low => 3,
            SeverityLevel::Info => 4,
        }
    }

    /// Exact, case-sensitive match. Anything else is not a severity.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(SeverityLevel::Critical),
            "High" => Some(SeverityLevel::High),
            "Medium" => Some(SeverityLevel::Medium),
            "Low" => Some(SeverityLevel::Low),
            "Info" => Some(SeverityLevel::Info),
            _ => None,
        }
    }

    /// Map a class probability onto a severity label
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.2 {
            SeverityLevel::Info
        } else if probability < 0.4 {
            SeverityLevel::Low
        } else if probability < 0.6 {
            SeverityLevel::Medium
        } else if probability < 0.8 {
            SeverityLevel::High
        } else {
            SeverityLevel::Critical
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_are_ordered() {
        let weights: Vec<f64> = SeverityLevel::ALL.iter().map(|s| s.weight()).collect();
        assert_eq!(weights, vec![100.0, 80.0, 50.0, 20.0, 0.0]);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(SeverityLevel::parse("High"), Some(SeverityLevel::High));
        assert_eq!(SeverityLevel::parse("high"), None);
        assert_eq!(SeverityLevel::parse("Severe"), None);
    }

    #[test]
    fn test_from_probability_boundaries() {
        assert_eq!(SeverityLevel::from_probability(0.0), SeverityLevel::Info);
        assert_eq!(SeverityLevel::from_probability(0.2), SeverityLevel::Low);
        assert_eq!(SeverityLevel::from_probability(0.59), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_probability(0.6), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_probability(0.8), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_probability(1.0), SeverityLevel::Critical);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, level) in SeverityLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }
}
