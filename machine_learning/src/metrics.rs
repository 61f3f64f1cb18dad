use ndarray::{Array1, ArrayView2, Axis};

use crate::{MlErr, Result};

/// Computes the mean absolute error of each output column.
///
/// # Arguments
/// * `y_true` - The expected values, one column per target.
/// * `y_pred` - The predicted values, same shape as `y_true`.
///
/// # Returns
/// One error per column.
pub fn mean_absolute_error(
    y_true: ArrayView2<f64>,
    y_pred: ArrayView2<f64>,
) -> Result<Array1<f64>> {
    if y_true.shape() != y_pred.shape() {
        return Err(MlErr::SizeMismatch {
            what: "predictions",
            got: y_pred.len(),
            expected: y_true.len(),
        });
    }

    (&y_true - &y_pred)
        .mapv(f64::abs)
        .mean_axis(Axis(0))
        .ok_or(MlErr::EmptyDataset)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn errors_are_per_column() {
        let y_true = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let y_pred = array![[1.5, 10.0], [2.0, 23.0], [2.0, 30.0]];

        let mae = mean_absolute_error(y_true.view(), y_pred.view()).unwrap();
        assert_eq!(mae, array![0.5, 1.0]);
    }

    #[test]
    fn shapes_must_match() {
        let y_true = array![[1.0, 2.0]];
        let y_pred = array![[1.0]];
        assert!(mean_absolute_error(y_true.view(), y_pred.view()).is_err());
    }

    #[test]
    fn no_rows_is_an_error() {
        let empty = ndarray::Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            mean_absolute_error(empty.view(), empty.view()),
            Err(MlErr::EmptyDataset)
        ));
    }
}
