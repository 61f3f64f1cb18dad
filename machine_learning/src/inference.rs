use std::{collections::BTreeMap, path::Path};

use crate::{
    MlErr, Result,
    artifact::ModelArtifact,
    dataset::{Record, Table},
};

/// The predicted value of every target, in the artifact's target order.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    values: Vec<(String, f64)>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the prediction for the `target` column.
    pub fn get(&self, target: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, v)| *v)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, v)| (name.as_str(), *v))
    }
}

/// Read-only wrapper around a loaded [`ModelArtifact`] answering single row predictions.
///
/// Safe to share between threads, nothing mutates the artifact after loading.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads the artifact stored at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        ModelArtifact::load(path).map(Self::new)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn features(&self) -> &[String] {
        self.artifact.features()
    }

    pub fn targets(&self) -> &[String] {
        self.artifact.targets()
    }

    pub fn mae(&self) -> &BTreeMap<String, f64> {
        self.artifact.mae()
    }

    /// Returns the required features absent from `record`, in feature order.
    pub fn missing_features(&self, record: &Record) -> Vec<String> {
        self.features()
            .iter()
            .filter(|name| !record.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Predicts every target for a single input row.
    ///
    /// Keys of `record` that aren't features are ignored.
    ///
    /// # Errors
    /// * `MlErr::MissingFeatures` listing the required features absent from `record`.
    /// * `MlErr::InvalidValue` if a value can't feed its feature's column.
    pub fn predict(&self, record: &Record) -> Result<Prediction> {
        let row = Table::from_record(self.features(), record)?;
        let output = self.artifact.model().predict(&row)?;

        let targets = self.targets();
        if output.nrows() != 1 || output.ncols() != targets.len() {
            return Err(MlErr::SizeMismatch {
                what: "prediction",
                got: output.len(),
                expected: targets.len(),
            });
        }

        let values = targets
            .iter()
            .cloned()
            .zip(output.row(0).iter().copied())
            .collect();

        Ok(Prediction { values })
    }
}
