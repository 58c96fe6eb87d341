//! Shared scan fixtures for tests

use serde_json::json;

use super::ScanData;

fn parse(value: serde_json::Value) -> ScanData {
    serde_json::from_value(value).expect("fixture must deserialize")
}

/// Healthy site: valid SSL, most headers, two minor findings
pub fn sample_scan() -> ScanData {
    parse(json!({
        "findings": [
            { "severity": "Medium", "title": "Finding 1" },
            { "severity": "Low", "title": "Finding 2" }
        ],
        "ssl": {
            "is_valid": true,
            "days_to_expiry": 90,
            "cipher_strength": 128,
            "has_pfs": true,
            "vulnerabilities": []
        },
        "headers": {
            "content_security_policy": true,
            "x_frame_options": true,
            "strict_transport_security": true,
            "x_content_type_options": true,
            "x_xss_protection": true
        },
        "content_analysis": {
            "external_script_count": 2,
            "inline_script_count": 1,
            "form_count": 1,
            "input_field_count": 3,
            "has_login_form": false,
            "cookie_count": 2
        },
        "server_info": {
            "version_disclosed": false,
            "is_outdated": false,
            "open_port_count": 2,
            "vulnerability_count": 0
        },
        "domain_reputation": {
            "is_blacklisted": false,
            "has_malware_history": false,
            "has_phishing_history": false,
            "risk_score": 5
        }
    }))
}

/// Everything wrong at once
pub fn high_risk_scan() -> ScanData {
    parse(json!({
        "findings": [
            { "severity": "Critical", "title": "Critical Finding" },
            { "severity": "High", "title": "High Finding 1" },
            { "severity": "High", "title": "High Finding 2" }
        ],
        "ssl": {
            "is_valid": false,
            "days_to_expiry": 5,
            "cipher_strength": 64,
            "has_pfs": false,
            "vulnerabilities": ["POODLE", "HEARTBLEED"]
        },
        "headers": {
            "content_security_policy": false,
            "x_frame_options": false,
            "strict_transport_security": false,
            "x_content_type_options": false,
            "x_xss_protection": false
        },
        "content_analysis": {
            "external_script_count": 8,
            "inline_script_count": 5,
            "form_count": 3,
            "input_field_count": 12,
            "has_login_form": true,
            "cookie_count": 10
        },
        "server_info": {
            "version_disclosed": true,
            "is_outdated": true,
            "open_port_count": 15,
            "vulnerability_count": 5
        },
        "domain_reputation": {
            "is_blacklisted": true,
            "has_malware_history": true,
            "has_phishing_history": true,
            "risk_score": 85
        }
    }))
}

/// No findings, nothing suspicious, all headers present
pub fn clean_scan() -> ScanData {
    parse(json!({
        "findings": [],
        "ssl": { "is_valid": true, "days_to_expiry": 200, "cipher_strength": 256, "has_pfs": true },
        "headers": {
            "content_security_policy": "default-src 'self'",
            "x_frame_options": "DENY",
            "strict_transport_security": "max-age=63072000",
            "x_content_type_options": "nosniff",
            "x_xss_protection": "1; mode=block",
            "referrer_policy": "no-referrer",
            "permissions_policy": "geolocation=()"
        },
        "content_analysis": { "suspicious_script_count": 0, "form_count": 0 },
        "url_info": { "uses_https": true }
    }))
}

/// Three critical findings naming SQL injection
pub fn sql_injection_scan() -> ScanData {
    parse(json!({
        "findings": [
            { "severity": "Critical", "title": "SQL Injection in login" },
            { "severity": "Critical", "name": "Blind SQL injection via id" },
            { "severity": "Critical", "title": "Unsanitised sql in search" }
        ]
    }))
}
