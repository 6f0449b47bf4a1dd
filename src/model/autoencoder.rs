//! Feed-forward autoencoder `input → 16 → 8 → 4 → 8 → 16 → input`.
//! ReLU on hidden layers, sigmoid on the output; trained with Adam on MAE
//! against its own input.

use super::adam::Adam;
use super::layer::{Activation, Dense, DenseGrad};
use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hidden widths from input to output, latent in the middle.
const HIDDEN: [(&str, usize); 5] = [
    ("encode_1", 16),
    ("encode_2", 8),
    ("latent_vector", 4),
    ("decode_1", 8),
    ("decode_2", 16),
];

pub const LATENT_DIM: usize = 4;

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Autoencoder {
    input_dim: usize,
    layers: Vec<Dense>,
}

/// Per-epoch mean absolute error on the training rows and on the hold-out rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss: Vec<f32>,
    /// Empty when nothing was held out.
    pub val_loss: Vec<f32>,
}

impl TrainingHistory {
    pub fn final_loss(&self) -> Option<f32> {
        self.loss.last().copied()
    }

    pub fn final_val_loss(&self) -> Option<f32> {
        self.val_loss.last().copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub inputs: usize,
    pub units: usize,
    pub activation: Activation,
    pub params: usize,
}

impl Autoencoder {
    /// Untrained network for `input_dim` features, randomly initialised.
    pub fn build(input_dim: usize) -> Self {
        Self::build_with_rng(input_dim, &mut seeded_rng(None))
    }

    pub fn build_with_rng<R: Rng>(input_dim: usize, rng: &mut R) -> Self {
        let mut layers = Vec::with_capacity(HIDDEN.len() + 1);
        let mut inputs = input_dim;
        for (name, units) in HIDDEN {
            layers.push(Dense::new(name, inputs, units, Activation::Relu, rng));
            inputs = units;
        }
        layers.push(Dense::new("output", inputs, input_dim, Activation::Sigmoid, rng));
        Self { input_dim, layers }
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Check that a stored network has the fixed topology for its input width.
    pub fn validate_topology(&self) -> std::result::Result<(), String> {
        let mut expected: Vec<(usize, usize, Activation)> = Vec::new();
        let mut inputs = self.input_dim;
        for (_, units) in HIDDEN {
            expected.push((inputs, units, Activation::Relu));
            inputs = units;
        }
        expected.push((inputs, self.input_dim, Activation::Sigmoid));

        if self.layers.len() != expected.len() {
            return Err(format!("expected {} layers, found {}", expected.len(), self.layers.len()));
        }
        for (layer, (i, u, act)) in self.layers.iter().zip(expected) {
            if layer.inputs() != i || layer.units() != u || layer.bias.len() != u || layer.activation != act {
                return Err(format!(
                    "layer {} is {}x{} {:?}, expected {}x{} {:?}",
                    layer.name,
                    layer.inputs(),
                    layer.units(),
                    layer.activation,
                    i,
                    u,
                    act
                ));
            }
        }
        Ok(())
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Dense::param_count).sum()
    }

    pub fn summary(&self) -> Vec<LayerSummary> {
        self.layers
            .iter()
            .map(|l| LayerSummary {
                name: l.name.clone(),
                inputs: l.inputs(),
                units: l.units(),
                activation: l.activation,
                params: l.param_count(),
            })
            .collect()
    }

    fn check_width(&self, data: &ArrayView2<'_, f32>) -> Result<()> {
        if data.ncols() != self.input_dim {
            return Err(Error::DimensionMismatch {
                expected: self.input_dim,
                found: data.ncols(),
            });
        }
        Ok(())
    }

    /// Activations of every layer; index 0 is the input itself.
    fn forward_trace(&self, input: ArrayView2<'_, f32>) -> Vec<Array2<f32>> {
        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(input.to_owned());
        for layer in &self.layers {
            let next = layer.forward(acts[acts.len() - 1].view());
            acts.push(next);
        }
        acts
    }

    fn forward(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut x = input.to_owned();
        for layer in &self.layers {
            x = layer.forward(x.view());
        }
        x
    }

    /// Forward pass over every row. Does not touch the weights.
    pub fn reconstruct(&self, data: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        self.check_width(&data)?;
        Ok(self.forward(data))
    }

    /// Mean absolute difference between each row and its reconstruction.
    pub fn reconstruction_errors(&self, data: ArrayView2<'_, f32>) -> Result<Array1<f32>> {
        let recon = self.reconstruct(data)?;
        Ok(row_mae(data, recon.view()))
    }

    /// Train with the configuration's epoch budget, entropy- or seed-driven.
    pub fn fit(&mut self, data: ArrayView2<'_, f32>, config: &TrainingConfig) -> Result<TrainingHistory> {
        let mut rng = seeded_rng(config.seed);
        self.fit_with_rng(data, config, &mut rng)
    }

    /// Mini-batch Adam on MAE(x, reconstruct(x)). The trailing rows past
    /// `floor(n * (1 - validation_split))` are held out and only scored.
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        data: ArrayView2<'_, f32>,
        config: &TrainingConfig,
        rng: &mut R,
    ) -> Result<TrainingHistory> {
        config.validate()?;
        self.check_width(&data)?;
        if data.nrows() == 0 {
            return Err(Error::EmptyDataset { stage: "no rows to fit the model" });
        }

        let split_at = split_index(data.nrows(), config.validation_split);
        let (train, val) = if split_at == data.nrows() {
            (data, None)
        } else {
            (data.slice_move(s![..split_at, ..]), Some(data.slice_move(s![split_at.., ..])))
        };

        let mut adam = Adam::new(config.learning_rate, &self.layers);
        let mut history = TrainingHistory::default();
        let mut order: Vec<usize> = (0..train.nrows()).collect();

        for epoch in 0..config.epochs {
            order.shuffle(rng);
            let mut weighted_loss = 0.0f32;
            for chunk in order.chunks(config.batch_size) {
                let batch = train.select(Axis(0), chunk);
                let loss = self.train_step(batch.view(), &mut adam);
                weighted_loss += loss * chunk.len() as f32;
            }
            let loss = weighted_loss / train.nrows() as f32;
            history.loss.push(loss);

            match val {
                Some(v) => {
                    let val_loss = row_mae(v, self.forward(v).view()).mean().unwrap_or(0.0);
                    history.val_loss.push(val_loss);
                    debug!(epoch = epoch + 1, loss, val_loss, "epoch complete");
                }
                None => debug!(epoch = epoch + 1, loss, "epoch complete"),
            }
        }
        Ok(history)
    }

    /// One forward/backward/update on a batch; returns the batch loss before the update.
    fn train_step(&mut self, batch: ArrayView2<'_, f32>, adam: &mut Adam) -> f32 {
        let acts = self.forward_trace(batch);
        let output = &acts[acts.len() - 1];
        let diff = output - &batch;
        let loss = diff.mapv(f32::abs).mean().unwrap_or(0.0);

        // d/dy of mean |y - x| over batch and features; zero at equality.
        let scale = 1.0 / diff.len() as f32;
        let mut grad = diff.mapv(|d| if d > 0.0 { scale } else if d < 0.0 { -scale } else { 0.0 });

        let mut grads: Vec<DenseGrad> = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (g, grad_input) = layer.backward(acts[i].view(), &acts[i + 1], grad);
            grads.push(g);
            grad = grad_input;
        }
        grads.reverse();
        adam.step(&mut self.layers, &grads);
        loss
    }
}

/// Rows kept for training: `floor(n * (1 - split))`, the rest is held out.
/// Falls back to all rows when either side would be empty.
fn split_index(n: usize, validation_split: f64) -> usize {
    let split_at = (n as f64 * (1.0 - validation_split)).floor() as usize;
    if split_at == 0 || split_at >= n {
        n
    } else {
        split_at
    }
}

fn row_mae(a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array1<f32> {
    let diff = &a - &b;
    let width = a.ncols().max(1) as f32;
    diff.mapv(f32::abs).sum_axis(Axis(1)) / width
}
