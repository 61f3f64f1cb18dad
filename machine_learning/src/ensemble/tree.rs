use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::Regressor;
use crate::{MlErr, Result};

/// Growth limits of a [`RegressionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// The minimum amount of samples a node needs to be split.
    pub min_samples_split: usize,
    /// The minimum amount of samples each side of a split must keep.
    pub min_samples_leaf: usize,
    /// The maximum depth, unbounded if `None`.
    pub max_depth: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A CART regression tree using the squared error criterion.
///
/// Nodes live in a flat arena, the root being the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    params: TreeParams,
    seed: u64,
    n_features: usize,
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Creates a new unfitted `RegressionTree`.
    ///
    /// # Arguments
    /// * `params` - The growth limits.
    /// * `seed` - Seeds the order in which features are tried when fitting through
    ///   [`Regressor::fit`].
    pub fn new(params: TreeParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            n_features: 0,
            nodes: Vec::new(),
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Grows the tree over a subset of the rows of `x`.
    ///
    /// # Arguments
    /// * `x` - The inputs, one row per sample.
    /// * `y` - The expected output of each sample.
    /// * `samples` - The rows to fit on, repeated rows weigh more.
    /// * `rng` - Shuffles the order in which features are tried on each node.
    pub fn fit_samples<R: Rng>(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: &[usize],
        rng: &mut R,
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                what: "tree targets",
                got: y.len(),
                expected: x.nrows(),
            });
        }
        if samples.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        self.n_features = x.ncols();
        self.nodes = vec![Node::Leaf { value: 0.0 }];

        let mut stack = vec![(0, samples.to_vec(), 0)];
        while let Some((idx, node_samples, depth)) = stack.pop() {
            let n = node_samples.len() as f64;
            let mean = node_samples.iter().map(|&i| y[i]).sum::<f64>() / n;
            let impurity = node_samples
                .iter()
                .map(|&i| (y[i] - mean).powi(2))
                .sum::<f64>()
                / n;

            let splittable = node_samples.len() >= self.params.min_samples_split
                && self.params.max_depth.is_none_or(|max| depth < max)
                && impurity > f64::EPSILON;

            let split = if splittable {
                self.best_split(x, y, &node_samples, rng)
            } else {
                None
            };

            let Some((feature, threshold)) = split else {
                self.nodes[idx] = Node::Leaf { value: mean };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = node_samples
                .into_iter()
                .partition(|&i| x[[i, feature]] <= threshold);

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(Node::Leaf { value: 0.0 });
            self.nodes.push(Node::Leaf { value: 0.0 });
            self.nodes[idx] = Node::Split {
                feature,
                threshold,
                left,
                right,
            };

            stack.push((right, right_samples, depth + 1));
            stack.push((left, left_samples, depth + 1));
        }

        Ok(())
    }

    /// Finds the split maximizing the decrease of the squared error.
    ///
    /// Features are tried in a random order and only a strictly better split replaces the
    /// current best one, so ties go to whichever feature came first.
    fn best_split<R: Rng>(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: &[usize],
        rng: &mut R,
    ) -> Option<(usize, f64)> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total: f64 = samples.iter().map(|&i| y[i]).sum();

        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut sorted = samples.to_vec();
        let mut best: Option<(f64, usize, f64)> = None;

        for feature in features {
            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            for i in 1..n {
                left_sum += y[sorted[i - 1]];

                let lo = x[[sorted[i - 1], feature]];
                let hi = x[[sorted[i], feature]];
                // Equal (or NaN) values can't be told apart by a threshold.
                if !(hi > lo) || i < min_leaf || n - i < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let proxy = left_sum * left_sum / i as f64 + right_sum * right_sum / (n - i) as f64;

                if best.is_none_or(|(p, _, _)| proxy > p) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some((proxy, feature, threshold));
                }
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }

    /// Predicts the output for a single input row.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    /// Checks the node arena of a deserialized tree.
    ///
    /// Every child must come after its parent and inside the arena, so walking down from the
    /// root always ends on a leaf.
    ///
    /// # Errors
    /// `MlErr::CorruptArtifact` describing the first broken node.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(MlErr::CorruptArtifact("regression tree has no nodes".into()));
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(MlErr::CorruptArtifact(format!(
                        "leaf {idx} holds a non-finite value"
                    )));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= self.n_features {
                        return Err(MlErr::CorruptArtifact(format!(
                            "node {idx} splits on feature {feature} of {}",
                            self.n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(MlErr::CorruptArtifact(format!(
                            "node {idx} has a NaN threshold"
                        )));
                    }
                    if [left, right].iter().any(|&child| child <= idx || child >= len) {
                        return Err(MlErr::CorruptArtifact(format!(
                            "node {idx} points to children {left} and {right} of {len} nodes"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub(super) fn check_input(&self, x: &ArrayView2<f64>) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(MlErr::NotFitted("regression tree"));
        }
        if x.ncols() != self.n_features {
            return Err(MlErr::SizeMismatch {
                what: "input columns",
                got: x.ncols(),
                expected: self.n_features,
            });
        }
        Ok(())
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        let samples: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.fit_samples(x, y, &samples, &mut rng)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.check_input(&x)?;
        Ok(x.rows().into_iter().map(|row| self.predict_row(row)).collect())
    }
}
