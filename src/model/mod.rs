//! Reconstruction model: a small dense autoencoder trained on normal traffic only.

mod adam;
mod autoencoder;
mod layer;

pub use adam::Adam;
pub use autoencoder::{Autoencoder, LayerSummary, TrainingHistory, LATENT_DIM};
pub use layer::{Activation, Dense, DenseGrad};

pub(crate) use autoencoder::seeded_rng;
