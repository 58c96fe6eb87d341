//! Scan Data Types
//!
//! Typed view of a website scan. Every group and field is optional on the
//! wire; absence, `null` and wrongly-typed values all fall back to
//! zero / false / empty. Deserialization never fails because of a single
//! malformed field.

use serde::{Deserialize, Serialize};

use super::severity::SeverityLevel;

// ============================================================================
// FINDINGS
// ============================================================================

/// A single scanner finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Raw severity string ("Critical", "High", ...). Unknown values are kept.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub severity: Option<String>,

    #[serde(default, alias = "name", deserialize_with = "de::string")]
    pub title: String,

    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Finding {
    pub fn new(severity: &str, title: &str) -> Self {
        Self {
            severity: Some(severity.to_string()),
            title: title.to_string(),
            description: None,
        }
    }

    /// Parsed severity, `None` for missing or unrecognised strings
    pub fn level(&self) -> Option<SeverityLevel> {
        self.severity.as_deref().and_then(SeverityLevel::parse)
    }
}

// ============================================================================
// GROUPS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SslInfo {
    #[serde(deserialize_with = "de::truthy")]
    pub is_valid: bool,
    #[serde(deserialize_with = "de::number")]
    pub days_to_expiry: f64,
    #[serde(deserialize_with = "de::number")]
    pub cipher_strength: f64,
    #[serde(deserialize_with = "de::truthy")]
    pub has_pfs: bool,
    #[serde(deserialize_with = "de::string_list")]
    pub vulnerabilities: Vec<String>,
}

/// Presence flags for the security headers. A header counts as present when
/// its value is truthy (non-empty string, `true`, non-zero).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityHeaders {
    #[serde(deserialize_with = "de::truthy")]
    pub content_security_policy: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub x_frame_options: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub strict_transport_security: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub x_content_type_options: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub x_xss_protection: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub referrer_policy: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub permissions_policy: bool,
}

impl SecurityHeaders {
    /// The six headers compliance scoring requires (permissions-policy excluded)
    pub fn required_flags(&self) -> [bool; 6] {
        [
            self.content_security_policy,
            self.x_frame_options,
            self.strict_transport_security,
            self.x_content_type_options,
            self.x_xss_protection,
            self.referrer_policy,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentAnalysis {
    #[serde(deserialize_with = "de::number")]
    pub external_script_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub inline_script_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub form_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub input_field_count: f64,
    #[serde(deserialize_with = "de::truthy")]
    pub has_login_form: bool,
    #[serde(deserialize_with = "de::number")]
    pub cookie_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub iframe_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub suspicious_script_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub external_link_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub redirect_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    #[serde(deserialize_with = "de::truthy")]
    pub version_disclosed: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub is_outdated: bool,
    #[serde(deserialize_with = "de::number")]
    pub open_port_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub vulnerability_count: f64,
    #[serde(deserialize_with = "de::string_list")]
    pub exposed_services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainReputation {
    #[serde(deserialize_with = "de::truthy")]
    pub is_blacklisted: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub has_malware_history: bool,
    #[serde(deserialize_with = "de::truthy")]
    pub has_phishing_history: bool,
    #[serde(deserialize_with = "de::number")]
    pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlInfo {
    #[serde(deserialize_with = "de::number")]
    pub subdomain_count: f64,
    #[serde(deserialize_with = "de::number")]
    pub path_depth: f64,
    #[serde(deserialize_with = "de::number")]
    pub query_param_count: f64,
    #[serde(deserialize_with = "de::truthy")]
    pub uses_https: bool,
}

/// Per-area summary scores produced by the scanner (0-100 each)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSummary {
    #[serde(deserialize_with = "de::number")]
    pub overall: f64,
    #[serde(deserialize_with = "de::number")]
    pub ssl: f64,
    #[serde(deserialize_with = "de::number")]
    pub headers: f64,
    #[serde(deserialize_with = "de::number")]
    pub vulnerabilities: f64,
    #[serde(deserialize_with = "de::number")]
    pub server: f64,
}

// ============================================================================
// SCAN DATA
// ============================================================================

/// Full scan record consumed by every extractor and scorer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanData {
    #[serde(deserialize_with = "de::findings")]
    pub findings: Vec<Finding>,
    #[serde(deserialize_with = "de::group")]
    pub ssl: SslInfo,
    #[serde(deserialize_with = "de::group")]
    pub headers: SecurityHeaders,
    #[serde(deserialize_with = "de::group")]
    pub content_analysis: ContentAnalysis,
    #[serde(deserialize_with = "de::group")]
    pub server_info: ServerInfo,
    #[serde(deserialize_with = "de::group")]
    pub domain_reputation: DomainReputation,
    #[serde(deserialize_with = "de::string_list")]
    pub misconfigurations: Vec<String>,
    #[serde(deserialize_with = "de::group")]
    pub url_info: UrlInfo,
    #[serde(deserialize_with = "de::group")]
    pub summary: ScanSummary,
}

impl ScanData {
    /// Count findings per severity in `SeverityLevel::ALL` order.
    /// Unrecognised or missing severities are skipped.
    pub fn severity_counts(&self) -> [usize; 5] {
        let mut counts = [0usize; 5];
        for level in self.findings.iter().filter_map(Finding::level) {
            counts[level.index()] += 1;
        }
        counts
    }

    /// Parse from a JSON value. Never fails on shape problems inside groups.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

// ============================================================================
// LENIENT DESERIALIZERS
// ============================================================================

mod de {
    use serde::de::DeserializeOwned;

    use super::Finding;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Keeps every entry that is an object parsing as a `Finding`; the rest
    /// are dropped one by one. A non-array is an empty list.
    pub fn findings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Finding>, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            _ => return Ok(Vec::new()),
        };
        Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    /// Only a JSON object parses as a group; anything else is the default
    pub fn group<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => T::default(),
        })
    }

    pub fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let n = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            Value::Bool(b) => f64::from(u8::from(b)),
            _ => 0.0,
        };
        Ok(if n.is_finite() { n } else { 0.0 })
    }

    /// Array of anything, each entry kept as a string. Non-arrays are empty.
    pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_defaults() {
        let scan: ScanData = serde_json::from_value(json!({})).unwrap();
        assert_eq!(scan, ScanData::default());
    }

    #[test]
    fn test_null_and_wrong_types_default() {
        let scan: ScanData = serde_json::from_value(json!({
            "ssl": null,
            "headers": ["not", "an", "object"],
            "server_info": { "open_port_count": "7", "is_outdated": 1 },
            "content_analysis": { "form_count": null },
        }))
        .unwrap();
        assert_eq!(scan.ssl, SslInfo::default());
        assert_eq!(scan.headers, SecurityHeaders::default());
        assert_eq!(scan.server_info.open_port_count, 7.0);
        assert!(scan.server_info.is_outdated);
        assert_eq!(scan.content_analysis.form_count, 0.0);
    }

    #[test]
    fn test_malformed_finding_drops_only_itself() {
        let scan: ScanData = serde_json::from_value(json!({
            "findings": [
                { "severity": "Critical", "title": "SQL injection" },
                "stray string entry",
                { "severity": "Critical", "title": "SQL injection 2" },
                ["not", "a", "finding"],
                null,
            ]
        }))
        .unwrap();
        assert_eq!(scan.findings.len(), 2);
        assert_eq!(scan.findings[1].title, "SQL injection 2");
        assert_eq!(scan.severity_counts(), [2, 0, 0, 0, 0]);

        let scan: ScanData = serde_json::from_value(json!({ "findings": "nope" })).unwrap();
        assert!(scan.findings.is_empty());
    }

    #[test]
    fn test_lists_keep_structured_entries() {
        let scan: ScanData = serde_json::from_value(json!({
            "misconfigurations": [{ "id": "dir-listing" }, "cors-wildcard"],
            "ssl": { "vulnerabilities": ["POODLE", { "name": "BEAST" }] },
        }))
        .unwrap();
        assert_eq!(scan.misconfigurations.len(), 2);
        assert_eq!(scan.ssl.vulnerabilities.len(), 2);
    }

    #[test]
    fn test_header_values_are_truthy() {
        let scan: ScanData = serde_json::from_value(json!({
            "headers": {
                "content_security_policy": "default-src 'self'",
                "x_frame_options": "",
                "strict_transport_security": true,
            }
        }))
        .unwrap();
        assert!(scan.headers.content_security_policy);
        assert!(!scan.headers.x_frame_options);
        assert!(scan.headers.strict_transport_security);
        assert!(!scan.headers.referrer_policy);
    }

    #[test]
    fn test_finding_name_alias() {
        let scan: ScanData = serde_json::from_value(json!({
            "findings": [{ "severity": "Critical", "name": "SQL Injection" }]
        }))
        .unwrap();
        assert_eq!(scan.findings[0].title, "SQL Injection");
        assert_eq!(scan.findings[0].level(), Some(SeverityLevel::Critical));
    }

    #[test]
    fn test_severity_counts_skip_unknown() {
        let scan = ScanData {
            findings: vec![
                Finding::new("Critical", "a"),
                Finding::new("High", "b"),
                Finding::new("High", "c"),
                Finding::new("Severe", "d"),
                Finding {
                    severity: None,
                    title: "e".into(),
                    description: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(scan.severity_counts(), [1, 2, 0, 0, 0]);
    }
}
