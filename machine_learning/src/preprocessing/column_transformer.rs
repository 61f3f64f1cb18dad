use log::debug;
use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};

use super::OneHotEncoder;
use crate::{
    MlErr, Result,
    dataset::{Column, Table, Value},
};

/// Turns a table into the numeric matrix the regressors consume.
///
/// Categorical columns are one-hot encoded and numeric columns passed through unchanged. The
/// output holds every one-hot block first, then every numeric column, each group in the order
/// given when fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    encoders: Vec<OneHotEncoder>,
    passthrough: Vec<String>,
}

impl ColumnTransformer {
    /// Fits a new `ColumnTransformer`.
    ///
    /// # Arguments
    /// * `table` - The training data.
    /// * `categorical` - The columns to one-hot encode.
    /// * `numeric` - The columns to pass through.
    ///
    /// # Returns
    /// The fitted transformer or an error if a column is missing.
    pub fn fit(table: &Table, categorical: &[String], numeric: &[String]) -> Result<Self> {
        let encoders = categorical
            .iter()
            .map(|name| match table.column(name) {
                Some(Column::Categorical(values)) => {
                    Ok(OneHotEncoder::fit(name, values.iter().map(String::as_str)))
                }
                Some(Column::Numeric(values)) => {
                    let labels: Vec<String> = values
                        .iter()
                        .map(|x| Value::Float(*x).to_category())
                        .collect();
                    Ok(OneHotEncoder::fit(name, labels.iter().map(String::as_str)))
                }
                None => Err(MlErr::MissingFeatures(vec![name.clone()])),
            })
            .collect::<Result<Vec<_>>>()?;

        let missing = table.missing_columns(numeric);
        if !missing.is_empty() {
            return Err(MlErr::MissingFeatures(missing));
        }

        let transformer = Self {
            encoders,
            passthrough: numeric.to_vec(),
        };

        debug!(
            "fitted column transformer: {} one-hot, {} passthrough, {} output column(s)",
            transformer.encoders.len(),
            transformer.passthrough.len(),
            transformer.n_features_out()
        );

        Ok(transformer)
    }

    /// Returns the width of the transformed matrix.
    pub fn n_features_out(&self) -> usize {
        self.encoders.iter().map(OneHotEncoder::width).sum::<usize>() + self.passthrough.len()
    }

    /// Names of the input columns the transformer reads.
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        self.encoders
            .iter()
            .map(OneHotEncoder::column)
            .chain(self.passthrough.iter().map(String::as_str))
    }

    /// Checks that a deserialized transformer can encode values.
    ///
    /// # Errors
    /// `MlErr::CorruptArtifact` if an encoder's categories aren't strictly sorted.
    pub fn validate(&self) -> Result<()> {
        for encoder in &self.encoders {
            if !encoder.categories().windows(2).all(|w| w[0] < w[1]) {
                return Err(MlErr::CorruptArtifact(format!(
                    "categories of {} aren't sorted",
                    encoder.column()
                )));
            }
        }

        Ok(())
    }

    /// Names of the output columns, `<column>_<category>` for one-hot slots.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.encoders
            .iter()
            .flat_map(|e| {
                e.categories()
                    .iter()
                    .map(move |c| format!("{}_{c}", e.column()))
            })
            .chain(self.passthrough.iter().cloned())
            .collect()
    }

    /// Transforms every row of `table`.
    ///
    /// # Errors
    /// * `MlErr::MissingFeatures` if a fitted column is absent.
    /// * `MlErr::InvalidValue` if a passthrough column holds a non-numeric or non-finite value.
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        let nrows = table.nrows();
        let mut out = Array2::zeros((nrows, self.n_features_out()));
        let mut offset = 0;

        for encoder in &self.encoders {
            let column = table
                .column(encoder.column())
                .ok_or_else(|| MlErr::MissingFeatures(vec![encoder.column().to_string()]))?;

            let width = encoder.width();
            for row in 0..nrows {
                let mut slot = out.slice_mut(s![row, offset..offset + width]);
                let Some(slot) = slot.as_slice_mut() else {
                    return Err(MlErr::SizeMismatch {
                        what: "one-hot block",
                        got: 0,
                        expected: width,
                    });
                };

                match column {
                    Column::Categorical(values) => encoder.encode_into(&values[row], slot),
                    Column::Numeric(values) => {
                        encoder.encode_into(&Value::Float(values[row]).to_category(), slot)
                    }
                }
            }

            offset += width;
        }

        for name in &self.passthrough {
            let column = table
                .column(name)
                .ok_or_else(|| MlErr::MissingFeatures(vec![name.clone()]))?;

            for row in 0..nrows {
                let value = match column {
                    Column::Numeric(values) => values[row],
                    Column::Categorical(values) => Value::Str(values[row].clone())
                        .as_f64()
                        .ok_or_else(|| MlErr::InvalidValue {
                            column: name.clone(),
                            value: values[row].clone(),
                        })?,
                };

                if !value.is_finite() {
                    return Err(MlErr::InvalidValue {
                        column: name.clone(),
                        value: value.to_string(),
                    });
                }
                out[[row, offset]] = value;
            }

            offset += 1;
        }

        Ok(out)
    }
}
