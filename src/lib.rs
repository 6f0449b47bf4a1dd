//! Unsupervised anomaly detection for HTTP access logs.
//!
//! Modular structure:
//! - [`features`]: Access-log parsing and the 3-feature request vector
//! - [`scaler`]: Min-max normalization fitted at training time
//! - [`model`]: Dense autoencoder trained on normal traffic only
//! - [`train`]: Training pipeline producing a model/scaler pair
//! - [`detect`]: Reconstruction-error scoring and threshold decision
//! - [`storage`]: Versioned, atomically published artifact pair
//! - [`logging`]: Structured logging and ndjson result lines

pub mod config;
pub mod detect;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod scaler;
pub mod storage;
pub mod train;

pub use config::{AppConfig, DetectionConfig, ScalerFit, TrainingConfig, DEFAULT_THRESHOLD};
pub use detect::{detect, Detection, Detections, Detector};
pub use error::{Error, Result};
pub use features::{FeatureExtractor, FeatureVector, LogRecord};
pub use logging::StructuredLogger;
pub use model::Autoencoder;
pub use scaler::MinMaxScaler;
pub use storage::{ArtifactPair, ArtifactStore};
pub use train::{train, Trainer, TrainingReport};
