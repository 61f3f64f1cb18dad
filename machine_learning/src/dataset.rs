mod csv;
mod table;
mod value;

pub use table::{Column, ColumnKind, Table};
pub use value::{Record, Value};
