//! Persistence of the trained model and its scaler as one matched pair.

mod pair;
mod store;

pub use pair::ArtifactPair;
pub use store::{ArtifactHeader, ArtifactKind, ArtifactStore, FORMAT_VERSION};
