pub mod csv_source;
pub mod json_store;

pub use csv_source::{read_rows, read_rows_from, TabularRow};
pub use json_store::*;
