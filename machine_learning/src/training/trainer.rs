use std::{collections::BTreeMap, ops::Range, path::Path};

use log::{debug, info};
use ndarray::s;

use super::{PipelineBuilder, TrainingConfig};
use crate::{
    MlErr, Result,
    artifact::{ModelArtifact, validate_columns},
    dataset::Table,
    metrics,
};

/// The outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact: ModelArtifact,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// Whether the validation rows were held out or are the training rows themselves.
    pub held_out: bool,
}

/// Fits a [`ModelArtifact`] from a table following a [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Reads the CSV file at `path` and trains on it.
    pub fn train_csv<P: AsRef<Path>>(&self, path: P) -> Result<TrainingReport> {
        let table = Table::from_csv_path(path)?;
        self.train(table)
    }

    /// Trains a model and measures its validation error.
    ///
    /// # Arguments
    /// * `table` - The whole dataset; it's sorted by the configured column when present.
    ///
    /// # Errors
    /// * `MlErr::MissingColumns` listing every requested feature and target absent from `table`.
    /// * `MlErr::InvalidConfig` if the column lists or split settings are unusable.
    /// * `MlErr::MissingValue` / `MlErr::NonNumericTarget` for unusable data.
    pub fn train(&self, mut table: Table) -> Result<TrainingReport> {
        let TrainingConfig {
            features,
            targets,
            n_estimators,
            seed,
            validation_fraction,
            min_rows_for_holdout,
            sort_column,
        } = &self.config;

        validate_columns(features, targets)?;
        if !(0.0..1.0).contains(validation_fraction) || *validation_fraction == 0.0 {
            return Err(MlErr::InvalidConfig(format!(
                "validation fraction must be in (0, 1), got {validation_fraction}"
            )));
        }

        if let Some(column) = sort_column.as_deref().filter(|c| table.has_column(c)) {
            table.sort_by_column(column)?;
            debug!("sorted rows by {column}");
        }

        let missing_features = table.missing_columns(features);
        let missing_targets = table.missing_columns(targets);
        if !missing_features.is_empty() || !missing_targets.is_empty() {
            return Err(MlErr::MissingColumns {
                features: missing_features,
                targets: missing_targets,
            });
        }

        let nrows = table.nrows();
        if nrows == 0 {
            return Err(MlErr::EmptyDataset);
        }

        table.ensure_complete(features)?;
        table.ensure_complete(targets)?;
        let y = table.numeric_matrix(targets)?;

        let (train_range, validation_range) =
            validation_split(nrows, *validation_fraction, *min_rows_for_holdout);
        let held_out = train_range != validation_range;
        info!(
            "training on {} rows, validating on {} rows{}",
            train_range.len(),
            validation_range.len(),
            if held_out { "" } else { " (no holdout, too few rows)" }
        );

        let train = table.slice_rows(train_range.clone());
        let validation = table.slice_rows(validation_range.clone());
        let y_train = y.slice(s![train_range.clone(), ..]);
        let y_validation = y.slice(s![validation_range.clone(), ..]);

        let mut pipeline = PipelineBuilder::new(*n_estimators, *seed).build(&train, features)?;
        pipeline.fit(&train, y_train)?;
        debug!(
            targets = targets.len(),
            trees = *n_estimators;
            "fitted pipeline"
        );

        let predictions = pipeline.predict(&validation)?;
        let errors = metrics::mean_absolute_error(y_validation, predictions.view())?;
        let mae: BTreeMap<String, f64> = targets
            .iter()
            .cloned()
            .zip(errors.iter().copied())
            .collect();

        let artifact = ModelArtifact::new(pipeline, features.clone(), targets.clone(), mae)?;
        info!("validation MAE: {}", artifact.mae_report());

        Ok(TrainingReport {
            artifact,
            train_rows: train_range.len(),
            validation_rows: validation_range.len(),
            held_out,
        })
    }
}

/// Splits `nrows` rows into training and validation ranges, without shuffling.
///
/// With at least `min_rows` rows the last `ceil(fraction * nrows)` rows are held out, otherwise
/// both ranges cover every row.
pub fn validation_split(
    nrows: usize,
    fraction: f64,
    min_rows: usize,
) -> (Range<usize>, Range<usize>) {
    if nrows < min_rows.max(2) {
        return (0..nrows, 0..nrows);
    }

    let n_validation = ((fraction * nrows as f64).ceil() as usize).clamp(1, nrows - 1);
    let n_train = nrows - n_validation;
    (0..n_train, n_train..nrows)
}
