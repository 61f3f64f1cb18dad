use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// Requested training columns are absent from the dataset.
    MissingColumns {
        features: Vec<String>,
        targets: Vec<String>,
    },
    /// Required features are absent from an inference input.
    MissingFeatures(Vec<String>),
    /// A value cannot be used for the column it was given for.
    InvalidValue { column: String, value: String },
    /// A numeric cell is empty.
    MissingValue { column: String, row: usize },
    /// A numeric cell holds an infinite value.
    NonFiniteValue { column: String, row: usize },
    /// A target column holds non-numeric data.
    NonNumericTarget(String),
    /// The feature and target lists are unusable as given.
    InvalidConfig(String),
    /// The CSV text could not be parsed.
    Csv { line: usize, msg: String },
    EmptyDataset,
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The estimator was used before being fitted.
    NotFitted(&'static str),
    /// A deserialized artifact doesn't describe a usable model.
    CorruptArtifact(String),
    Io(io::Error),
    Serde(serde_json::Error),
}

impl MlErr {
    /// Whether the error is caused by the caller's input schema, and can be fixed by
    /// resubmitting corrected input.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            MlErr::MissingColumns { .. } | MlErr::MissingFeatures(_) | MlErr::InvalidValue { .. }
        )
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::MissingColumns { features, targets } => write!(
                f,
                "missing columns. Features: [{}]. Targets: [{}]",
                features.join(", "),
                targets.join(", ")
            ),
            MlErr::MissingFeatures(names) => {
                write!(f, "missing features: {}", names.join(", "))
            }
            MlErr::InvalidValue { column, value } => {
                write!(f, "invalid value '{value}' for feature {column}")
            }
            MlErr::MissingValue { column, row } => {
                write!(f, "column {column} has an empty value at row {row}")
            }
            MlErr::NonFiniteValue { column, row } => {
                write!(f, "column {column} has a non-finite value at row {row}")
            }
            MlErr::NonNumericTarget(column) => {
                write!(f, "target column {column} must be numeric")
            }
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::Csv { line, msg } => write!(f, "csv line {line}: {msg}"),
            MlErr::EmptyDataset => write!(f, "the dataset has no rows"),
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "there's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::NotFitted(what) => write!(f, "{what} was used before being fitted"),
            MlErr::CorruptArtifact(msg) => write!(f, "corrupt model artifact: {msg}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Serde(e) => write!(f, "artifact (de)serialization error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<MlErr> for io::Error {
    fn from(value: MlErr) -> Self {
        match value {
            MlErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
