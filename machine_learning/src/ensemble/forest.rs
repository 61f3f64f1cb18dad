use log::debug;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Regressor, RegressionTree, TreeParams};
use crate::{MlErr, Result};

/// A bagged ensemble of [`RegressionTree`]s, predicting the mean of its trees.
///
/// Tree `i` draws its bootstrap sample and feature orders from a generator seeded with
/// `seed + i`, so a fit is reproducible no matter how the trees are spread across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    seed: u64,
    bootstrap: bool,
    tree_params: TreeParams,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub const DEFAULT_N_ESTIMATORS: usize = 300;
    pub const DEFAULT_SEED: u64 = 42;

    /// Creates a new unfitted `RandomForestRegressor` with fully grown, bootstrapped trees.
    ///
    /// # Arguments
    /// * `n_estimators` - The amount of trees.
    /// * `seed` - The base seed of every tree's generator.
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            seed,
            bootstrap: true,
            tree_params: TreeParams::default(),
            trees: Vec::new(),
        }
    }

    pub fn with_tree_params(mut self, tree_params: TreeParams) -> Self {
        self.tree_params = tree_params;
        self
    }

    /// Fits every tree on the whole dataset instead of a bootstrap sample.
    pub fn without_bootstrap(mut self) -> Self {
        self.bootstrap = false;
        self
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Checks that a deserialized forest is fitted and every tree reads `n_features` inputs.
    ///
    /// # Errors
    /// `MlErr::CorruptArtifact` if a tree is broken or expects another input width.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(MlErr::CorruptArtifact("random forest has no trees".into()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != n_features {
                return Err(MlErr::CorruptArtifact(format!(
                    "tree {i} reads {} features, expected {n_features}",
                    tree.n_features()
                )));
            }
            tree.validate()?;
        }

        Ok(())
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_N_ESTIMATORS, Self::DEFAULT_SEED)
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MlErr::InvalidConfig(
                "a forest needs at least one tree".into(),
            ));
        }

        let nrows = x.nrows();
        if nrows == 0 {
            return Err(MlErr::EmptyDataset);
        }

        let Self {
            n_estimators,
            seed,
            bootstrap,
            tree_params,
            ..
        } = *self;

        self.trees = (0..n_estimators)
            .into_par_iter()
            .map(|i| {
                let tree_seed = seed.wrapping_add(i as u64);
                let mut rng = StdRng::seed_from_u64(tree_seed);

                let samples: Vec<usize> = if bootstrap {
                    (0..nrows).map(|_| rng.random_range(0..nrows)).collect()
                } else {
                    (0..nrows).collect()
                };

                let mut tree = RegressionTree::new(tree_params, tree_seed);
                tree.fit_samples(x, y, &samples, &mut rng)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            trees = n_estimators,
            samples = nrows;
            "fitted random forest"
        );

        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let first = self
            .trees
            .first()
            .ok_or(MlErr::NotFitted("random forest"))?;
        first.check_input(&x)?;

        let ntrees = self.trees.len() as f64;
        let predictions = x
            .rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / ntrees
            })
            .collect();

        Ok(predictions)
    }
}
