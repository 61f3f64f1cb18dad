use log::debug;

use crate::{
    Result,
    dataset::{ColumnKind, Table},
    ensemble::{MultiOutputRegressor, RandomForestRegressor},
    pipeline::Pipeline,
    preprocessing::ColumnTransformer,
};

/// Builds unfitted regressors on top of a preprocessor fitted to the training data.
#[derive(Debug, Clone, Copy)]
pub struct PipelineBuilder {
    n_estimators: usize,
    seed: u64,
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder`.
    ///
    /// # Arguments
    /// * `n_estimators` - The amount of trees in each target's forest.
    /// * `seed` - The forests' seed.
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self { n_estimators, seed }
    }

    /// Builds a new `Pipeline` for the given features.
    ///
    /// # Arguments
    /// * `train` - The training rows, used to pick each feature's encoding and to fit the
    ///   preprocessor.
    /// * `features` - The input columns.
    pub fn build(&self, train: &Table, features: &[String]) -> Result<Pipeline> {
        let (categorical, numeric) = self.resolve_columns(train, features);
        let preprocessor = ColumnTransformer::fit(train, &categorical, &numeric)?;
        let model = self.resolve_model();
        Ok(Pipeline::new(preprocessor, model))
    }

    /// Splits the features by storage kind: categorical columns first, numeric ones second.
    fn resolve_columns(&self, train: &Table, features: &[String]) -> (Vec<String>, Vec<String>) {
        let (categorical, numeric): (Vec<String>, Vec<String>) =
            features.iter().cloned().partition(|name| {
                train
                    .column(name)
                    .is_some_and(|c| c.kind() == ColumnKind::Categorical)
            });

        debug!("categorical features: {categorical:?}, numeric features: {numeric:?}");
        (categorical, numeric)
    }

    fn resolve_model(&self) -> MultiOutputRegressor<RandomForestRegressor> {
        MultiOutputRegressor::new(RandomForestRegressor::new(self.n_estimators, self.seed))
    }
}
