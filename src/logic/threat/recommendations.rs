//! Remediation advice per threat category

use super::types::ThreatCategory;

/// Fixed remediation list for a category ("none" gets general hygiene advice)
pub fn recommendations(category: ThreatCategory) -> &'static [&'static str] {
    match category {
        ThreatCategory::Malware => &[
            "Scan the entire site with a malware scanner",
            "Check for unauthorized file modifications",
            "Review server logs for suspicious activities",
            "Ensure all CMS and plugins are up to date",
        ],
        ThreatCategory::Phishing => &[
            "Verify legitimacy of all forms collecting user data",
            "Implement anti-phishing headers (DMARC, SPF, DKIM)",
            "Review all scripts for suspicious behavior",
            "Add client-side form validation",
        ],
        ThreatCategory::CommandInjection => &[
            "Sanitize all user inputs used in system commands",
            "Implement input validation for all parameters",
            "Use parameterized APIs instead of direct command execution",
            "Apply the principle of least privilege for execution contexts",
        ],
        ThreatCategory::SqlInjection => &[
            "Use parameterized queries or prepared statements",
            "Implement input validation for all database queries",
            "Apply proper escaping for user-supplied data",
            "Consider using an ORM with built-in protections",
        ],
        ThreatCategory::Xss => &[
            "Implement Content-Security-Policy headers",
            "Sanitize all user inputs displayed on pages",
            "Use framework-provided XSS protection features",
            "Encode output appropriately for the HTML context",
        ],
        ThreatCategory::Csrf => &[
            "Implement anti-CSRF tokens in all forms",
            "Use SameSite cookie attributes",
            "Verify the Origin and Referer headers",
            "Consider using the Double Submit Cookie pattern",
        ],
        ThreatCategory::OpenRedirect => &[
            "Validate and sanitize all redirect URLs",
            "Use a whitelist of allowed redirect destinations",
            "Implement indirect reference maps for redirects",
            "Consider not allowing external redirects at all",
        ],
        ThreatCategory::InsecureDeserialization => &[
            "Avoid deserializing data from untrusted sources",
            "Implement integrity checks for serialized data",
            "Use safer alternatives like JSON with schema validation",
            "Apply the principle of least privilege for deserialization processes",
        ],
        ThreatCategory::NoThreat => &[
            "Continue regular security scanning",
            "Keep all software and dependencies up to date",
            "Implement security headers if not already present",
            "Consider a Web Application Firewall for additional protection",
        ],
    }
}

/// Owned copy for a result record
pub fn recommendation_list(category: ThreatCategory) -> Vec<String> {
    recommendations(category).iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_advice() {
        for category in ThreatCategory::ALL {
            let recs = recommendations(category);
            assert!((3..=4).contains(&recs.len()), "{category}");
        }
        assert!(recommendations(ThreatCategory::SqlInjection)[0].contains("parameterized"));
    }
}
