//! A trained model and the scaler fitted in the same run, kept together.

use crate::error::{Error, Result};
use crate::model::Autoencoder;
use crate::scaler::MinMaxScaler;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPair {
    run_id: Uuid,
    trained_at: DateTime<Utc>,
    model: Autoencoder,
    scaler: MinMaxScaler,
}

impl ArtifactPair {
    /// Bundle a freshly trained pair under a new run id.
    pub fn new(model: Autoencoder, scaler: MinMaxScaler) -> Result<Self> {
        Self::from_parts(Uuid::new_v4(), Utc::now(), model, scaler)
    }

    pub fn from_parts(
        run_id: Uuid,
        trained_at: DateTime<Utc>,
        model: Autoencoder,
        scaler: MinMaxScaler,
    ) -> Result<Self> {
        if model.input_dim() != scaler.dim() {
            return Err(Error::ArtifactMismatch {
                reason: format!(
                    "model expects {} features, scaler was fitted on {}",
                    model.input_dim(),
                    scaler.dim()
                ),
            });
        }
        Ok(Self {
            run_id,
            trained_at,
            model,
            scaler,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn input_dim(&self) -> usize {
        self.model.input_dim()
    }

    pub fn model(&self) -> &Autoencoder {
        &self.model
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mismatched_widths_are_rejected() {
        let scaler = MinMaxScaler::fit(array![[1.0, 2.0, 3.0, 4.0]].view()).unwrap();
        let err = ArtifactPair::new(Autoencoder::build(3), scaler).unwrap_err();
        assert!(matches!(err, Error::ArtifactMismatch { .. }));
    }

    #[test]
    fn matching_widths_pair_up() {
        let scaler = MinMaxScaler::fit(array![[1.0, 2.0, 3.0]].view()).unwrap();
        let pair = ArtifactPair::new(Autoencoder::build(3), scaler).unwrap();
        assert_eq!(pair.input_dim(), 3);
    }
}
