mod forest;
mod multi_output;
mod regressor;
mod tree;

pub use forest::RandomForestRegressor;
pub use multi_output::MultiOutputRegressor;
pub use regressor::Regressor;
pub use tree::{RegressionTree, TreeParams};
