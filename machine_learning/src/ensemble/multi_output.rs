use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::{MlErr, Result};

/// Fits one independent clone of a single output regressor per target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOutputRegressor<R> {
    template: R,
    estimators: Vec<R>,
}

impl<R> MultiOutputRegressor<R>
where
    R: Regressor + Clone,
{
    /// Creates a new `MultiOutputRegressor`.
    ///
    /// # Arguments
    /// * `template` - The unfitted estimator cloned for every target.
    pub fn new(template: R) -> Self {
        Self {
            template,
            estimators: Vec::new(),
        }
    }

    pub fn n_outputs(&self) -> usize {
        self.estimators.len()
    }

    pub fn estimators(&self) -> &[R] {
        &self.estimators
    }

    /// Fits one estimator per column of `y`.
    ///
    /// # Arguments
    /// * `x` - The inputs, one row per sample.
    /// * `y` - The expected outputs, one row per sample and one column per target.
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<()> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "target rows",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }
        if y.ncols() == 0 {
            return Err(MlErr::InvalidConfig("there are no targets to fit".into()));
        }

        self.estimators = y
            .columns()
            .into_iter()
            .map(|target| {
                let mut estimator = self.template.clone();
                estimator.fit(x, target)?;
                Ok(estimator)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    /// Predicts every target for every row of `x`.
    ///
    /// # Returns
    /// A `(rows, targets)` matrix.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if self.estimators.is_empty() {
            return Err(MlErr::NotFitted("multi-output regressor"));
        }

        let mut out = Array2::zeros((x.nrows(), self.estimators.len()));
        for (estimator, mut column) in self.estimators.iter().zip(out.columns_mut()) {
            column.assign(&estimator.predict(x)?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::ensemble::{RegressionTree, TreeParams};

    #[test]
    fn each_target_gets_its_own_estimator() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![[1.0, 30.0], [2.0, 20.0], [3.0, 10.0]];

        let mut model = MultiOutputRegressor::new(RegressionTree::new(TreeParams::default(), 0));
        model.fit(x.view(), y.view()).unwrap();

        assert_eq!(model.n_outputs(), 2);
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![[1.0]];

        let mut model = MultiOutputRegressor::new(RegressionTree::new(TreeParams::default(), 0));
        assert!(matches!(
            model.fit(x.view(), y.view()),
            Err(MlErr::SizeMismatch { .. })
        ));
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let model = MultiOutputRegressor::new(RegressionTree::new(TreeParams::default(), 0));
        assert!(matches!(
            model.predict(array![[1.0]].view()),
            Err(MlErr::NotFitted(_))
        ));
    }
}
