//! Scan Module
//!
//! Typed scan record consumed by the extractors and scorers.
//!
//! ## Structure
//! - `types`: `ScanData` and its optional groups (lenient deserialization)
//! - `severity`: `SeverityLevel` and its weights

pub mod severity;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use severity::SeverityLevel;
pub use types::{
    ContentAnalysis, DomainReputation, Finding, ScanData, ScanSummary, SecurityHeaders,
    ServerInfo, SslInfo, UrlInfo,
};
