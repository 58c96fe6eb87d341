//! Artifact Storage
//!
//! One training run = three JSON files per family, saved and loaded as a set:
//!
//! ```text
//! <model_dir>/<family>_model.json
//! <model_dir>/<family>_scaler.json
//! <model_dir>/<family>_metrics.json
//! ```
//!
//! Each file is an envelope `{ header, payload }`. The header carries the
//! format version, family, run id (shared by the three files), feature layout
//! version + hash, creation time and a SHA-256 of the payload. Saves go to
//! `*.tmp` first and are renamed into place once all three are written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::logic::config::EngineConfig;
use crate::logic::error::StorageError;
use crate::logic::features::validate_layout;
use crate::logic::training::TrainedModel;

use super::{FamilyModel, ModelFamily};

/// Bump when the envelope shape changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

// ============================================================================
// HEADER / ENVELOPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
    Scaler,
    Metrics,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Metrics => "metrics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub family: ModelFamily,
    pub kind: ArtifactKind,
    pub run_id: Uuid,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of the compact JSON payload
    pub checksum: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    header: ArtifactHeader,
    payload: serde_json::Value,
}

fn checksum(payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// PATHS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub metrics: PathBuf,
}

impl ArtifactPaths {
    pub fn all(&self) -> [(&Path, ArtifactKind); 3] {
        [
            (self.model.as_path(), ArtifactKind::Model),
            (self.scaler.as_path(), ArtifactKind::Scaler),
            (self.metrics.as_path(), ArtifactKind::Metrics),
        ]
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.model_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self, family: ModelFamily) -> ArtifactPaths {
        let file = |kind: ArtifactKind| self.dir.join(format!("{}_{}.json", family, kind.as_str()));
        ArtifactPaths {
            model: file(ArtifactKind::Model),
            scaler: file(ArtifactKind::Scaler),
            metrics: file(ArtifactKind::Metrics),
        }
    }

    /// All three artifacts present (not necessarily valid)
    pub fn exists(&self, family: ModelFamily) -> bool {
        self.paths(family).all().iter().all(|(p, _)| p.exists())
    }

    /// Persist a training run. Returns the model artifact's header.
    pub fn save<M: FamilyModel>(&self, trained: &TrainedModel<M>) -> Result<ArtifactHeader, StorageError> {
        let family = M::FAMILY;
        let domain = family.domain();
        let paths = self.paths(family);
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(e, &self.dir))?;

        let run_id = Uuid::new_v4();
        let created_at = Utc::now();

        let payloads = [
            (paths.model.as_path(), ArtifactKind::Model, to_value(&trained.model, &paths.model)?),
            (paths.scaler.as_path(), ArtifactKind::Scaler, to_value(&trained.scaler, &paths.scaler)?),
            (paths.metrics.as_path(), ArtifactKind::Metrics, to_value(&trained.metrics, &paths.metrics)?),
        ];

        let mut model_header = None;
        for (path, kind, payload) in payloads.iter() {
            let header = ArtifactHeader {
                format_version: ARTIFACT_FORMAT_VERSION,
                family,
                kind: *kind,
                run_id,
                layout_version: domain.version(),
                layout_hash: domain.layout_hash(),
                created_at,
                checksum: checksum(payload),
            };
            let envelope = Envelope {
                header: header.clone(),
                payload: payload.clone(),
            };
            let bytes = serde_json::to_vec_pretty(&envelope).map_err(|e| StorageError::json(e, *path))?;
            let tmp = tmp_path(path);
            fs::write(&tmp, bytes).map_err(|e| StorageError::io(e, &tmp))?;
            if *kind == ArtifactKind::Model {
                model_header = Some(header);
            }
        }

        for (path, _, _) in payloads.iter() {
            let tmp = tmp_path(path);
            fs::rename(&tmp, path).map_err(|e| StorageError::io(e, *path))?;
            log::info!("Saved {} artifact to {:?}", family, path);
        }

        model_header.ok_or(StorageError::Incomplete {
            family,
            missing: vec![paths.model.clone()],
        })
    }

    /// Load and verify a complete artifact set
    pub fn load<M: FamilyModel>(&self) -> Result<TrainedModel<M>, StorageError> {
        let family = M::FAMILY;
        let paths = self.paths(family);

        let missing: Vec<PathBuf> = paths
            .all()
            .iter()
            .filter(|(p, _)| !p.exists())
            .map(|(p, _)| p.to_path_buf())
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::Incomplete { family, missing });
        }

        let model = self.read_envelope(&paths.model, family)?;
        let scaler = self.read_envelope(&paths.scaler, family)?;
        let metrics = self.read_envelope(&paths.metrics, family)?;

        if scaler.header.run_id != model.header.run_id || metrics.header.run_id != model.header.run_id {
            return Err(StorageError::RunMismatch { family });
        }

        let trained = TrainedModel {
            model: from_value(model.payload, &paths.model)?,
            scaler: from_value(scaler.payload, &paths.scaler)?,
            metrics: from_value(metrics.payload, &paths.metrics)?,
        };
        log::info!("Loaded {} model (run {}) from {:?}", family, model.header.run_id, self.dir);
        Ok(trained)
    }

    /// Header of the stored model artifact, verified
    pub fn read_header(&self, family: ModelFamily) -> Result<ArtifactHeader, StorageError> {
        let path = self.paths(family).model;
        Ok(self.read_envelope(&path, family)?.header)
    }

    fn read_envelope(&self, path: &Path, family: ModelFamily) -> Result<Envelope, StorageError> {
        let bytes = fs::read(path).map_err(|e| StorageError::io(e, path))?;
        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| StorageError::json(e, path))?;
        let header = &envelope.header;

        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(StorageError::FormatVersion {
                found: header.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        if header.family != family {
            return Err(StorageError::FamilyMismatch {
                path: path.to_path_buf(),
                expected: family,
                found: header.family,
            });
        }
        let actual = checksum(&envelope.payload);
        if actual != header.checksum {
            return Err(StorageError::Checksum {
                path: path.to_path_buf(),
                expected: header.checksum.clone(),
                actual,
            });
        }
        validate_layout(family.domain(), header.layout_version, header.layout_hash)?;

        Ok(envelope)
    }
}

fn to_value<T: Serialize>(value: &T, path: &Path) -> Result<serde_json::Value, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::json(e, path))
}

fn from_value<T: DeserializeOwned>(value: serde_json::Value, path: &Path) -> Result<T, StorageError> {
    serde_json::from_value(value).map_err(|e| StorageError::json(e, path))
}
