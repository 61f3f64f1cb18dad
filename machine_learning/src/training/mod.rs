mod builder;
mod config;
mod trainer;

pub use builder::PipelineBuilder;
pub use config::{DEFAULT_FEATURES, DEFAULT_TARGETS, TrainingConfig};
pub use trainer::{Trainer, TrainingReport, validation_split};
