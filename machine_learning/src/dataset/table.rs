use std::{cmp::Ordering, fs, ops::Range, path::Path};

use log::debug;
use ndarray::Array2;

use super::{Record, Value, csv};
use crate::{MlErr, Result};

/// How a column's values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// A single table column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cell at `row` as a [`Value`].
    ///
    /// # Panics
    /// If `row` is out of bounds.
    pub fn value(&self, row: usize) -> Value {
        match self {
            Column::Numeric(values) => Value::Float(values[row]),
            Column::Categorical(values) => Value::Str(values[row].clone()),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&i| values[i]).collect()),
            Column::Categorical(values) => {
                Column::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }

    /// Infers the column's kind from its raw cells: numeric when every non-empty cell parses
    /// as a float, categorical otherwise. Empty numeric cells are stored as `NaN`.
    fn infer(cells: Vec<String>) -> Self {
        let mut any_value = false;
        let mut numbers = Vec::with_capacity(cells.len());

        for cell in &cells {
            if cell.is_empty() {
                numbers.push(f64::NAN);
                continue;
            }
            match cell.parse::<f64>() {
                Ok(x) => {
                    any_value = true;
                    numbers.push(x);
                }
                Err(_) => return Column::Categorical(cells),
            }
        }

        if any_value {
            Column::Numeric(numbers)
        } else {
            Column::Categorical(cells)
        }
    }
}

/// A column oriented, in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    nrows: usize,
}

impl Table {
    /// Creates a new `Table`.
    ///
    /// # Arguments
    /// * `names` - The column names.
    /// * `columns` - The columns, in the same order as `names`.
    ///
    /// # Returns
    /// A new `Table` or an error if the columns don't line up.
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(MlErr::SizeMismatch {
                what: "column names",
                got: names.len(),
                expected: columns.len(),
            });
        }

        let nrows = columns.first().map(Column::len).unwrap_or_default();
        if let Some(bad) = columns.iter().find(|c| c.len() != nrows) {
            return Err(MlErr::SizeMismatch {
                what: "column rows",
                got: bad.len(),
                expected: nrows,
            });
        }

        Ok(Self {
            names,
            columns,
            nrows,
        })
    }

    /// Reads a table from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let table = Self::from_csv_str(&content)?;
        debug!(
            "read {} rows and {} columns from {}",
            table.nrows(),
            table.ncols(),
            path.display()
        );
        Ok(table)
    }

    /// Parses a table from CSV text, inferring each column's kind.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let raw = csv::parse(content)?;

        let mut cells: Vec<Vec<String>> =
            vec![Vec::with_capacity(raw.rows.len()); raw.header.len()];
        for row in raw.rows {
            for (col, cell) in cells.iter_mut().zip(row) {
                col.push(cell);
            }
        }

        let columns = cells.into_iter().map(Column::infer).collect();

        Self::new(raw.header, columns)
    }

    /// Builds a single row table holding the `names` fields of `record`, in that order.
    ///
    /// Numbers become numeric columns and strings categorical ones.
    ///
    /// # Errors
    /// `MlErr::MissingFeatures` listing every name absent from `record`.
    pub fn from_record(names: &[String], record: &Record) -> Result<Self> {
        let missing: Vec<_> = names
            .iter()
            .filter(|name| !record.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(MlErr::MissingFeatures(missing));
        }

        let columns = names
            .iter()
            .map(|name| match &record[name] {
                Value::Int(i) => Column::Numeric(vec![*i as f64]),
                Value::Float(x) => Column::Numeric(vec![*x]),
                Value::Str(s) => Column::Categorical(vec![s.clone()]),
            })
            .collect();

        Self::new(names.to_vec(), columns)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Returns the names in `wanted` that are not columns of this table, in order.
    pub fn missing_columns(&self, wanted: &[String]) -> Vec<String> {
        wanted
            .iter()
            .filter(|name| !self.has_column(name))
            .cloned()
            .collect()
    }

    /// Checks that every cell of the named numeric columns holds a finite number.
    ///
    /// # Errors
    /// * `MlErr::MissingValue` pointing at the first empty cell found.
    /// * `MlErr::NonFiniteValue` pointing at the first infinite cell found.
    pub fn ensure_complete(&self, names: &[String]) -> Result<()> {
        for name in names {
            let Some(Column::Numeric(values)) = self.column(name) else {
                continue;
            };

            let Some(row) = values.iter().position(|v| !v.is_finite()) else {
                continue;
            };

            let column = name.clone();
            return Err(if values[row].is_nan() {
                MlErr::MissingValue { column, row }
            } else {
                MlErr::NonFiniteValue { column, row }
            });
        }

        Ok(())
    }

    /// Stably sorts the rows by the values of the `name` column.
    ///
    /// Numeric columns sort by value, categorical ones lexicographically.
    pub fn sort_by_column(&mut self, name: &str) -> Result<()> {
        let key = self
            .column(name)
            .ok_or_else(|| MlErr::MissingColumns {
                features: vec![name.to_string()],
                targets: vec![],
            })?;

        let mut order: Vec<usize> = (0..self.nrows).collect();
        match key {
            Column::Numeric(values) => order.sort_by(|&a, &b| {
                values[a]
                    .partial_cmp(&values[b])
                    .unwrap_or(Ordering::Equal)
            }),
            Column::Categorical(values) => order.sort_by(|&a, &b| values[a].cmp(&values[b])),
        }

        self.columns = self.columns.iter().map(|c| c.select(&order)).collect();
        Ok(())
    }

    /// Returns a new table with the given contiguous rows.
    pub fn slice_rows(&self, rows: Range<usize>) -> Self {
        let rows: Vec<usize> = rows.collect();
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(&rows)).collect(),
            nrows: rows.len(),
        }
    }

    /// Returns a new table with only the named columns, in the given order.
    pub fn select_columns(&self, names: &[String]) -> Result<Self> {
        let missing = self.missing_columns(names);
        if !missing.is_empty() {
            return Err(MlErr::MissingColumns {
                features: missing,
                targets: vec![],
            });
        }

        let columns = names
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect();

        Self::new(names.to_vec(), columns)
    }

    /// Packs the named numeric columns into a `(rows, columns)` matrix.
    ///
    /// # Errors
    /// `MlErr::NonNumericTarget` if one of the columns is categorical.
    pub fn numeric_matrix(&self, names: &[String]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((self.nrows, names.len()));

        for (j, name) in names.iter().enumerate() {
            match self.column(name) {
                Some(Column::Numeric(values)) => {
                    for (i, v) in values.iter().enumerate() {
                        matrix[[i, j]] = *v;
                    }
                }
                Some(Column::Categorical(_)) => return Err(MlErr::NonNumericTarget(name.clone())),
                None => {
                    return Err(MlErr::MissingColumns {
                        features: vec![],
                        targets: vec![name.clone()],
                    });
                }
            }
        }

        Ok(matrix)
    }
}
