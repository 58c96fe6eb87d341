//! Logic Module - scoring core
//!
//! Pure scoring over a typed scan record, plus the training and model
//! lifecycle that back the model paths.
//!
//! ## Structure
//! - `scan/` - ScanData record and severity levels
//! - `features/` - Feature extraction (risk 31, threat 22, anomaly 12)
//! - `model/` - Estimators (scaler, trees, boosting, forests) and metrics
//! - `risk/`, `threat/`, `anomaly/` - The three scorers
//! - `training/` - Datasets, synthetic generators, per-family training
//! - `lifecycle/` - Artifact storage and the model manager
//! - `engine` - Facade producing a `SiteAssessment`

pub mod config;
pub mod error;

pub mod scan;
pub mod features;
pub mod model;

pub mod risk;
pub mod threat;
pub mod anomaly;

pub mod training;
pub mod lifecycle;

pub mod engine;
