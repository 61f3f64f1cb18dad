use crate::ensemble::RandomForestRegressor;

/// The feature columns used when none are given.
pub const DEFAULT_FEATURES: [&str; 9] = [
    "weight_kg",
    "height_cm",
    "age",
    "sex",
    "waist_cm",
    "hip_cm",
    "steps",
    "training_minutes",
    "calories",
];

/// The target columns used when none are given.
pub const DEFAULT_TARGETS: [&str; 3] = ["body_fat_pct", "lean_mass_kg", "bmr"];

/// Everything a training run needs besides the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub features: Vec<String>,
    pub targets: Vec<String>,
    /// Trees per target.
    pub n_estimators: usize,
    pub seed: u64,
    /// Share of the rows, taken from the end, held out for validation.
    pub validation_fraction: f64,
    /// Below this many rows the model is validated on its own training data.
    pub min_rows_for_holdout: usize,
    /// Rows are sorted by this column first, when the table has it.
    pub sort_column: Option<String>,
}

impl TrainingConfig {
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            n_estimators: RandomForestRegressor::DEFAULT_N_ESTIMATORS,
            seed: RandomForestRegressor::DEFAULT_SEED,
            validation_fraction: 0.2,
            min_rows_for_holdout: 10,
            sort_column: Some("date".to_string()),
        }
    }
}
