use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One-hot encoder for a single categorical column.
///
/// Categories are learned sorted. A value that wasn't seen while fitting encodes to an all-zero
/// block instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Learns the categories of a column.
    ///
    /// # Arguments
    /// * `column` - The column's name.
    /// * `values` - Every value of the column in the training data.
    ///
    /// # Returns
    /// A fitted `OneHotEncoder`.
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let categories: BTreeSet<&str> = values.into_iter().collect();

        Self {
            column: column.to_string(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the amount of output columns this encoder produces.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Writes the encoding of `value` into `out`, which must be `width()` long and zeroed.
    pub fn encode_into(&self, value: &str, out: &mut [f64]) {
        if let Ok(idx) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            out[idx] = 1.0;
        }
    }
}
