mod column_transformer;
mod one_hot;

pub use column_transformer::ColumnTransformer;
pub use one_hot::OneHotEncoder;
