use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    dataset::Table,
    ensemble::{MultiOutputRegressor, RandomForestRegressor},
    preprocessing::ColumnTransformer,
};

/// Preprocessing followed by one random forest per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    preprocessor: ColumnTransformer,
    model: MultiOutputRegressor<RandomForestRegressor>,
}

impl Pipeline {
    /// Creates a new `Pipeline`.
    ///
    /// # Arguments
    /// * `preprocessor` - An already fitted column transformer.
    /// * `model` - The regressor fed with the transformer's output.
    pub fn new(
        preprocessor: ColumnTransformer,
        model: MultiOutputRegressor<RandomForestRegressor>,
    ) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn model(&self) -> &MultiOutputRegressor<RandomForestRegressor> {
        &self.model
    }

    /// Fits the regressor on the preprocessed `table`.
    ///
    /// # Arguments
    /// * `table` - The training inputs.
    /// * `y` - The training targets, one row per table row.
    pub fn fit(&mut self, table: &Table, y: ArrayView2<f64>) -> Result<()> {
        let x = self.preprocessor.transform(table)?;
        self.model.fit(x.view(), y)
    }

    /// Predicts every target for every row of `table`.
    ///
    /// # Returns
    /// A `(rows, targets)` matrix.
    pub fn predict(&self, table: &Table) -> Result<Array2<f64>> {
        let x = self.preprocessor.transform(table)?;
        self.model.predict(x.view())
    }

    /// Checks that a deserialized pipeline is consistent: one fitted forest per target, each
    /// reading exactly the columns the preprocessor produces.
    ///
    /// # Errors
    /// `MlErr::CorruptArtifact` describing the first inconsistency.
    pub fn validate(&self, n_targets: usize) -> Result<()> {
        self.preprocessor.validate()?;

        let estimators = self.model.estimators();
        if estimators.len() != n_targets {
            return Err(MlErr::CorruptArtifact(format!(
                "{} estimator(s) for {n_targets} target(s)",
                estimators.len()
            )));
        }

        let width = self.preprocessor.n_features_out();
        for forest in estimators {
            forest.validate(width)?;
        }

        Ok(())
    }
}
