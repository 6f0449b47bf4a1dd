//! Error type shared by the training and detection pipelines.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fitting or subset selection produced zero rows.
    #[error("empty dataset: {stage}")]
    EmptyDataset { stage: &'static str },

    #[error("feature width {found} does not match model input width {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    /// One or both artifacts of a pair are missing; run training first.
    #[error("artifact(s) not found: {}; run training first", display_paths(.paths))]
    ArtifactNotFound { paths: Vec<PathBuf> },

    /// Model and scaler do not belong together.
    #[error("artifact mismatch: {reason}")]
    ArtifactMismatch { reason: String },

    #[error("invalid artifact {}: {reason}", .path.display())]
    ArtifactFormat { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
