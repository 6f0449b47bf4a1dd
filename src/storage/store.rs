//! On-disk artifact pair: two versioned JSON envelopes, each published by
//! write-to-temp + rename so a reader never observes a half-written file.

use super::ArtifactPair;
use crate::config::ArtifactsConfig;
use crate::error::{Error, Result};
use crate::model::Autoencoder;
use crate::scaler::MinMaxScaler;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
    Scaler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub kind: ArtifactKind,
    pub format_version: u32,
    pub run_id: Uuid,
    pub input_dim: usize,
    pub created_at: DateTime<Utc>,
    /// SHA-256 (hex) of the body's JSON encoding
    pub checksum: String,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    header: ArtifactHeader,
    body: serde_json::Value,
}

fn checksum(body: &serde_json::Value) -> String {
    format!("{:x}", Sha256::digest(body.to_string().as_bytes()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
    let written = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

pub struct ArtifactStore {
    model_path: PathBuf,
    scaler_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            model_path: config.model_path(),
            scaler_path: config.scaler_path(),
        }
    }

    /// Store with the default file names under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(&ArtifactsConfig {
            dir: dir.into(),
            ..ArtifactsConfig::default()
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    /// Publish both artifacts, scaler first. A concurrent reader sees either
    /// the old pair, the new pair, or a run-id disagreement it refuses.
    pub fn save(&self, pair: &ArtifactPair) -> Result<()> {
        self.write_envelope(&self.scaler_path, ArtifactKind::Scaler, pair, pair.scaler())?;
        self.write_envelope(&self.model_path, ArtifactKind::Model, pair, pair.model())?;
        info!(
            run_id = %pair.run_id(),
            model = %self.model_path.display(),
            scaler = %self.scaler_path.display(),
            "artifacts saved"
        );
        Ok(())
    }

    fn write_envelope<T: Serialize>(
        &self,
        path: &Path,
        kind: ArtifactKind,
        pair: &ArtifactPair,
        body: &T,
    ) -> Result<()> {
        let format_err = |e: serde_json::Error| Error::ArtifactFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let body = serde_json::to_value(body).map_err(format_err)?;
        let envelope = Envelope {
            header: ArtifactHeader {
                kind,
                format_version: FORMAT_VERSION,
                run_id: pair.run_id(),
                input_dim: pair.input_dim(),
                created_at: pair.trained_at(),
                checksum: checksum(&body),
            },
            body,
        };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(format_err)?;
        write_atomic(path, &bytes)
    }

    /// Load and cross-check both artifacts.
    pub fn load(&self) -> Result<ArtifactPair> {
        let model_raw = read_optional(&self.model_path)?;
        let scaler_raw = read_optional(&self.scaler_path)?;
        let (model_raw, scaler_raw) = match (model_raw, scaler_raw) {
            (Some(m), Some(s)) => (m, s),
            (m, s) => {
                let mut paths = Vec::new();
                if m.is_none() {
                    paths.push(self.model_path.clone());
                }
                if s.is_none() {
                    paths.push(self.scaler_path.clone());
                }
                return Err(Error::ArtifactNotFound { paths });
            }
        };

        let (model_header, model): (_, Autoencoder) =
            decode(&self.model_path, &model_raw, ArtifactKind::Model)?;
        let (scaler_header, scaler): (_, MinMaxScaler) =
            decode(&self.scaler_path, &scaler_raw, ArtifactKind::Scaler)?;

        if model_header.run_id != scaler_header.run_id {
            return Err(Error::ArtifactMismatch {
                reason: format!(
                    "model is from run {}, scaler from run {}",
                    model_header.run_id, scaler_header.run_id
                ),
            });
        }
        model.validate_topology().map_err(|reason| Error::ArtifactFormat {
            path: self.model_path.clone(),
            reason,
        })?;
        if model_header.input_dim != model.input_dim() || scaler_header.input_dim != scaler.dim() {
            return Err(Error::ArtifactMismatch {
                reason: format!(
                    "headers declare {}/{} features, bodies hold {}/{}",
                    model_header.input_dim,
                    scaler_header.input_dim,
                    model.input_dim(),
                    scaler.dim()
                ),
            });
        }

        let pair = ArtifactPair::from_parts(model_header.run_id, model_header.created_at, model, scaler)?;
        info!(run_id = %pair.run_id(), input_dim = pair.input_dim(), "artifacts loaded");
        Ok(pair)
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn decode<T: DeserializeOwned>(path: &Path, raw: &[u8], kind: ArtifactKind) -> Result<(ArtifactHeader, T)> {
    let invalid = |reason: String| Error::ArtifactFormat {
        path: path.to_path_buf(),
        reason,
    };
    let envelope: Envelope = serde_json::from_slice(raw).map_err(|e| invalid(e.to_string()))?;
    let header = envelope.header;
    if header.kind != kind {
        return Err(invalid(format!("expected a {:?} artifact, found {:?}", kind, header.kind)));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format version {} (expected {})",
            header.format_version, FORMAT_VERSION
        )));
    }
    if checksum(&envelope.body) != header.checksum {
        return Err(invalid("checksum mismatch".to_string()));
    }
    let body = serde_json::from_value(envelope.body).map_err(|e| invalid(e.to_string()))?;
    Ok((header, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pair() -> ArtifactPair {
        let scaler = MinMaxScaler::fit(array![[24.0, 0.0, 200.0], [32.0, 3.0, 404.0]].view()).unwrap();
        ArtifactPair::new(Autoencoder::build(3), scaler).unwrap()
    }

    #[test]
    fn roundtrip_preserves_weights_and_ranges_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::in_dir(dir.path());
        let original = pair();
        store.save(&original).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.run_id(), original.run_id());
        assert_eq!(loaded.model(), original.model());
        assert_eq!(loaded.scaler(), original.scaler());
    }

    #[test]
    fn missing_files_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::in_dir(dir.path());
        match store.load() {
            Err(Error::ArtifactNotFound { paths }) => assert_eq!(paths.len(), 2),
            other => panic!("unexpected {other:?}"),
        }

        store.save(&pair()).unwrap();
        fs::remove_file(store.scaler_path()).unwrap();
        match store.load() {
            Err(Error::ArtifactNotFound { paths }) => assert_eq!(paths, vec![store.scaler_path().to_path_buf()]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pairs_from_different_runs_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::in_dir(dir.path());
        store.save(&pair()).unwrap();
        let first_scaler = fs::read(store.scaler_path()).unwrap();
        store.save(&pair()).unwrap();
        fs::write(store.scaler_path(), first_scaler).unwrap();
        assert!(matches!(store.load(), Err(Error::ArtifactMismatch { .. })));
    }

    #[test]
    fn tampered_body_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::in_dir(dir.path());
        store.save(&pair()).unwrap();
        let mut env: serde_json::Value =
            serde_json::from_slice(&fs::read(store.scaler_path()).unwrap()).unwrap();
        env["body"]["max"][0] = serde_json::json!(99.0);
        fs::write(store.scaler_path(), serde_json::to_vec(&env).unwrap()).unwrap();
        assert!(matches!(store.load(), Err(Error::ArtifactFormat { .. })));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::in_dir(dir.path());
        store.save(&pair()).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }
}
