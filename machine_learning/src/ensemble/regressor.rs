use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::Result;

/// A single output regression estimator.
pub trait Regressor {
    /// Fits the estimator.
    ///
    /// # Arguments
    /// * `x` - The inputs, one row per sample.
    /// * `y` - The expected output of each sample.
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()>;

    /// Predicts one output per row of `x`.
    ///
    /// # Errors
    /// If the estimator isn't fitted or `x` has the wrong amount of columns.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>;
}
