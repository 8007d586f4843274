//! Tabular time-series input: the table type, its schema, canonicalization
//! and polars interop.

pub mod canonicalize;
pub mod frame;
pub mod schema;
pub mod table;

pub use canonicalize::{AnomalyReport, AnomalyType, Canonicalizer, Severity};
pub use frame::{from_dataframe, read_parquet, to_dataframe, write_parquet, DATE_COLUMN};
pub use schema::{MacroSchema, SchemaError};
pub use table::TimeSeriesTable;
