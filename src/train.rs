//! Training: extract → keep normal rows → fit scaler → fit autoencoder on the normal rows.

use crate::config::{ScalerFit, TrainingConfig};
use crate::error::{Error, Result};
use crate::features::FeatureExtractor;
use crate::model::{seeded_rng, Autoencoder, TrainingHistory};
use crate::scaler::MinMaxScaler;
use crate::storage::ArtifactPair;
use ndarray::Axis;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    /// Lines that parsed
    pub total: usize,
    /// Rows the model was fitted on
    pub normal: usize,
    pub skipped: usize,
    pub history: TrainingHistory,
}

pub struct Trainer {
    config: TrainingConfig,
    extractor: FeatureExtractor,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: FeatureExtractor::new(),
        })
    }

    pub fn train<I, S>(&self, lines: I) -> Result<(ArtifactPair, TrainingReport)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.extractor.extract_batch(lines);
        if batch.is_empty() {
            return Err(Error::EmptyDataset { stage: "no parseable log lines" });
        }

        let normal_rows: Vec<usize> = batch
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status_code == self.config.normal_status)
            .map(|(i, _)| i)
            .collect();
        if normal_rows.is_empty() {
            return Err(Error::EmptyDataset { stage: "no lines with the normal status code" });
        }
        let normal = batch.matrix.select(Axis(0), &normal_rows);

        let scaler = match self.config.scaler_fit {
            ScalerFit::All => MinMaxScaler::fit(batch.matrix.view())?,
            ScalerFit::Normal => MinMaxScaler::fit(normal.view())?,
        };
        let train_data = scaler.transform(normal.view())?;
        info!(
            total = batch.len(),
            normal = normal_rows.len(),
            skipped = batch.skipped,
            "training on {} of {} logs",
            normal_rows.len(),
            batch.len()
        );

        let mut rng = seeded_rng(self.config.seed);
        let mut model = Autoencoder::build_with_rng(train_data.ncols(), &mut rng);
        info!(params = model.param_count(), "autoencoder built");
        for layer in model.summary() {
            info!(
                layer = %layer.name,
                inputs = layer.inputs,
                units = layer.units,
                activation = ?layer.activation,
                params = layer.params,
                "model layer"
            );
        }
        let history = model.fit_with_rng(train_data.view(), &self.config, &mut rng)?;
        info!(
            epochs = history.loss.len(),
            loss = history.final_loss(),
            val_loss = history.final_val_loss(),
            "training complete"
        );

        let pair = ArtifactPair::new(model, scaler)?;
        let report = TrainingReport {
            total: batch.len(),
            normal: normal_rows.len(),
            skipped: batch.skipped,
            history,
        };
        Ok((pair, report))
    }
}

/// Train a fresh model/scaler pair with default parameters.
pub fn train<I, S>(lines: I) -> Result<ArtifactPair>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (pair, _) = Trainer::new(TrainingConfig::default())?.train(lines)?;
    Ok(pair)
}
