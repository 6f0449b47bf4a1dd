//! Feature extraction from raw access-log lines.

mod pipeline;
mod record;

pub use pipeline::{ExtractedBatch, FeatureExtractor};
pub use record::{extract, LogRecord};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Number of numeric features derived from one record.
pub const FEATURE_DIM: usize = 3;

/// Fixed-order feature tuple `(request_length, special_char_count, status_code)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_DIM],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn request_length(&self) -> f32 {
        self.values[0]
    }

    pub fn special_char_count(&self) -> f32 {
        self.values[1]
    }

    pub fn status_code(&self) -> f32 {
        self.values[2]
    }
}

/// Characters that do not count as "special" in a request line.
fn is_plain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '/' | '?' | '.' | '=' | '&')
}

/// Derive the feature vector of a record. Total and pure.
pub fn to_features(record: &LogRecord) -> FeatureVector {
    let request_length = record.request_line.chars().count();
    let special = record.request_line.chars().filter(|c| !is_plain_char(*c)).count();
    FeatureVector {
        values: [request_length as f32, special as f32, record.status_code as f32],
    }
}

/// Stack feature vectors into an `n x FEATURE_DIM` matrix, one row per vector.
pub fn to_matrix(vectors: &[FeatureVector]) -> Array2<f32> {
    let mut m = Array2::<f32>::zeros((vectors.len(), FEATURE_DIM));
    for (mut row, fv) in m.rows_mut().into_iter().zip(vectors) {
        for (dst, src) in row.iter_mut().zip(fv.as_slice()) {
            *dst = *src;
        }
    }
    m
}
