//! Scoring: extract → normalize with the stored scaler → reconstruct → threshold.

mod scorer;

pub use scorer::{AnomalyScorer, Verdict};

use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureExtractor, LogRecord};
use crate::storage::ArtifactPair;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome for one parsed log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub record: LogRecord,
    pub error: f32,
    pub is_anomalous: bool,
}

impl Detection {
    pub fn request(&self) -> &str {
        &self.record.request_line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub scored: usize,
    pub anomalies: usize,
    pub skipped: usize,
    pub threshold: f32,
}

/// Results in input order, one per parsed line. Malformed lines are absent.
pub struct Detections {
    inner: std::iter::Zip<std::vec::IntoIter<LogRecord>, std::vec::IntoIter<f32>>,
    scorer: AnomalyScorer,
    summary: DetectionSummary,
}

impl Detections {
    pub fn summary(&self) -> DetectionSummary {
        self.summary
    }
}

impl Iterator for Detections {
    type Item = Detection;

    fn next(&mut self) -> Option<Detection> {
        let (record, error) = self.inner.next()?;
        Some(Detection {
            record,
            error,
            is_anomalous: self.scorer.classify(error).is_anomalous(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Detections {}

pub struct Detector<'a> {
    artifacts: &'a ArtifactPair,
    scorer: AnomalyScorer,
    extractor: FeatureExtractor,
}

impl<'a> Detector<'a> {
    pub fn new(artifacts: &'a ArtifactPair, config: DetectionConfig) -> Result<Self> {
        Ok(Self {
            artifacts,
            scorer: AnomalyScorer::new(config)?,
            extractor: FeatureExtractor::new(),
        })
    }

    pub fn threshold(&self) -> f32 {
        self.scorer.threshold()
    }

    /// Reconstruction error of every row of a raw (unnormalized) feature matrix.
    pub fn score_matrix(&self, features: ArrayView2<'_, f32>) -> Result<Array1<f32>> {
        let expected = self.artifacts.input_dim();
        if features.ncols() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: features.ncols(),
            });
        }
        let normalized = self.artifacts.scaler().transform(features)?;
        self.artifacts.model().reconstruction_errors(normalized.view())
    }

    pub fn detect<I, S>(&self, lines: I) -> Result<Detections>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.extractor.extract_batch(lines);
        let errors = self.score_matrix(batch.matrix.view())?;
        let threshold = self.scorer.threshold();
        let anomalies = errors.iter().filter(|e| **e > threshold).count();
        let summary = DetectionSummary {
            scored: batch.len(),
            anomalies,
            skipped: batch.skipped,
            threshold,
        };
        if batch.is_empty() {
            info!(skipped = batch.skipped, "no log data to detect");
        } else {
            info!(
                scored = summary.scored,
                anomalies,
                skipped = summary.skipped,
                threshold,
                "detection complete"
            );
        }
        Ok(Detections {
            inner: batch.records.into_iter().zip(errors.to_vec()),
            scorer: self.scorer.clone(),
            summary,
        })
    }
}

/// Score `lines` against a trained pair with the given threshold.
pub fn detect<I, S>(lines: I, artifacts: &ArtifactPair, threshold: f32) -> Result<Detections>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = DetectionConfig {
        threshold,
        ..DetectionConfig::default()
    };
    Detector::new(artifacts, config)?.detect(lines)
}
