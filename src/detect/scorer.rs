//! Threshold decision over reconstruction errors.

use crate::config::DetectionConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomalous,
}

impl Verdict {
    /// Strictly above the threshold is anomalous; equal is normal.
    pub fn from_error(error: f32, threshold: f32) -> Self {
        if error > threshold {
            Verdict::Anomalous
        } else {
            Verdict::Normal
        }
    }

    pub fn is_anomalous(self) -> bool {
        self == Verdict::Anomalous
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    config: DetectionConfig,
}

impl AnomalyScorer {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scorer with the default configuration and a caller-chosen threshold.
    pub fn with_threshold(threshold: f32) -> Result<Self> {
        Self::new(DetectionConfig {
            threshold,
            ..DetectionConfig::default()
        })
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    pub fn classify(&self, error: f32) -> Verdict {
        Verdict::from_error(error, self.config.threshold)
    }
}
