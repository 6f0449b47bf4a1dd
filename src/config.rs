//! Detector configuration. Loaded from JSON when present, otherwise defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reconstruction-error cutoff used when none is configured.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the model/scaler pair lives
    pub artifacts: ArtifactsConfig,
    /// Autoencoder training parameters
    pub training: TrainingConfig,
    /// Scoring decision
    pub detection: DetectionConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub model_file: String,
    pub scaler_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Full passes over the normal subset
    pub epochs: usize,
    pub batch_size: usize,
    /// Share of trailing rows held out for loss monitoring only
    pub validation_split: f64,
    pub learning_rate: f32,
    /// Status code treated as normal traffic
    pub normal_status: u32,
    /// Fixes weight init and shuffling when set
    pub seed: Option<u64>,
    /// Rows the normalizer range is computed from
    pub scaler_fit: ScalerFit,
}

/// Which parsed rows the min-max range is fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerFit {
    /// Every parsed row, whatever its status
    #[default]
    All,
    /// Only the normal-status subset; tighter range, more sensitive detector
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Errors strictly above this are anomalous
    pub threshold: f32,
    /// Report every scored line, not only anomalies
    pub report_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            model_file: "anomaly_detector_model.json".to_string(),
            scaler_file: "scaler.json".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 16,
            validation_split: 0.2,
            learning_rate: 0.01,
            normal_status: 200,
            seed: None,
            scaler_fit: ScalerFit::All,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            report_all: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(Error::InvalidConfig(format!(
                "validation_split {} outside [0, 1)",
                self.validation_split
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate {} must be a positive number",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold {} must be a non-negative number",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }
}

impl AppConfig {
    /// Read and validate a JSON config. Only a missing file falls back to
    /// defaults; unreadable, malformed or out-of-range settings are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: AppConfig = serde_json::from_str(&data)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        self.detection.validate()
    }
}
