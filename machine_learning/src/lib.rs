pub mod artifact;
pub mod dataset;
pub mod ensemble;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub use artifact::ModelArtifact;
pub use dataset::{Record, Table, Value};
pub use error::{MlErr, Result};
pub use inference::{Prediction, Predictor};
pub use training::{Trainer, TrainingConfig};
