use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, pipeline::Pipeline};

/// The persisted outcome of a training run: the fitted pipeline, the schema it expects and its
/// validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    model: Pipeline,
    features: Vec<String>,
    targets: Vec<String>,
    #[serde(default)]
    mae: BTreeMap<String, f64>,
}

impl ModelArtifact {
    /// Creates a new `ModelArtifact`.
    ///
    /// # Arguments
    /// * `model` - The fitted pipeline.
    /// * `features` - The input columns, in the order the pipeline consumes them.
    /// * `targets` - The output columns, in the order the pipeline produces them.
    /// * `mae` - The validation mean absolute error of each target.
    ///
    /// # Errors
    /// * `MlErr::InvalidConfig` if the feature and target lists are empty, repeat a name or
    ///   overlap.
    /// * `MlErr::CorruptArtifact` if `model` doesn't fit the lists.
    pub fn new(
        model: Pipeline,
        features: Vec<String>,
        targets: Vec<String>,
        mae: BTreeMap<String, f64>,
    ) -> Result<Self> {
        validate_columns(&features, &targets)?;

        let artifact = Self {
            model,
            features,
            targets,
            mae,
        };
        artifact.check_model()?;
        Ok(artifact)
    }

    /// Checks that the pipeline only reads listed features and predicts every target.
    fn check_model(&self) -> Result<()> {
        if let Some(column) = self
            .model
            .preprocessor()
            .input_columns()
            .find(|c| !self.features.iter().any(|f| f == c))
        {
            return Err(MlErr::CorruptArtifact(format!(
                "the model reads {column}, which isn't a feature"
            )));
        }

        self.model.validate(self.targets.len())
    }

    pub fn model(&self) -> &Pipeline {
        &self.model
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn mae(&self) -> &BTreeMap<String, f64> {
        &self.mae
    }

    /// Formats the validation errors in target order, e.g. `bmr=12.3400`.
    pub fn mae_report(&self) -> String {
        self.targets
            .iter()
            .filter_map(|t| self.mae.get(t).map(|v| format!("{t}={v:.4}")))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Writes the artifact to `path` as JSON, creating the parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;

        info!("saved model artifact to {}", path.display());
        Ok(())
    }

    /// Reads an artifact previously written by [`ModelArtifact::save`].
    ///
    /// # Errors
    /// * `MlErr::Io` if the file can't be read.
    /// * `MlErr::Serde` if it isn't a valid artifact.
    /// * `MlErr::InvalidConfig` / `MlErr::CorruptArtifact` if it parses but can't be used.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let artifact: Self = serde_json::from_reader(reader)?;
        validate_columns(&artifact.features, &artifact.targets)?;
        artifact.check_model()?;

        debug!(
            "loaded model artifact from {} ({} features, {} targets)",
            path.display(),
            artifact.features.len(),
            artifact.targets.len()
        );
        Ok(artifact)
    }
}

/// Checks that the feature and target lists are non-empty, have no repeated names and don't
/// share any name.
pub fn validate_columns(features: &[String], targets: &[String]) -> Result<()> {
    if features.is_empty() {
        return Err(MlErr::InvalidConfig("the feature list is empty".into()));
    }
    if targets.is_empty() {
        return Err(MlErr::InvalidConfig("the target list is empty".into()));
    }

    let mut seen = HashSet::with_capacity(features.len() + targets.len());
    if let Some(dup) = features.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(MlErr::InvalidConfig(format!("feature {dup} is listed twice")));
    }

    let mut target_seen = HashSet::with_capacity(targets.len());
    for name in targets {
        if seen.contains(name.as_str()) {
            return Err(MlErr::InvalidConfig(format!(
                "{name} is both a feature and a target"
            )));
        }
        if !target_seen.insert(name.as_str()) {
            return Err(MlErr::InvalidConfig(format!("target {name} is listed twice")));
        }
    }

    Ok(())
}
