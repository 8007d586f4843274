//! Conversion between [`TimeSeriesTable`] and polars `DataFrame`, plus Parquet output.
//!
//! The presentation side works with data frames; the core works with
//! `TimeSeriesTable`. Dates are stored as a polars `Date` column named `date`,
//! and missing values travel as NaN in both directions (nulls read from a
//! frame become NaN).

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::canonicalize::Canonicalizer;
use super::schema::SchemaError;
use super::table::TimeSeriesTable;

pub const DATE_COLUMN: &str = "date";

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn polars_err(e: PolarsError) -> SchemaError {
    SchemaError::Polars(e.to_string())
}

/// Convert a table to a DataFrame with a leading `date` column.
pub fn to_dataframe(table: &TimeSeriesTable) -> Result<DataFrame, SchemaError> {
    let epoch = epoch();
    let days: Vec<i32> = table
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut cols = Vec::with_capacity(table.column_names().len() + 1);
    cols.push(
        Column::new(DATE_COLUMN.into(), days)
            .cast(&DataType::Date)
            .map_err(polars_err)?,
    );
    for (name, values) in table.columns() {
        cols.push(Column::new(name.into(), values.to_vec()));
    }

    DataFrame::new(cols).map_err(polars_err)
}

/// Convert a DataFrame back to a canonical table.
///
/// Requires a `date` column of polars type `Date`; every other column must be
/// `Float64`. Rows are sorted and deduplicated on the way in.
pub fn from_dataframe(df: &DataFrame) -> Result<TimeSeriesTable, SchemaError> {
    let date_col = df
        .column(DATE_COLUMN)
        .map_err(|_| SchemaError::MissingColumn(DATE_COLUMN.to_string()))?;
    if date_col.dtype() != &DataType::Date {
        return Err(SchemaError::TypeMismatch {
            column: DATE_COLUMN.to_string(),
            expected: format!("{:?}", DataType::Date),
            actual: format!("{:?}", date_col.dtype()),
        });
    }
    let date_ca = date_col.date().map_err(polars_err)?;

    let epoch = epoch();
    let mut dates = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = date_ca.get(i).ok_or(SchemaError::NullDate(i))?;
        dates.push(epoch + chrono::Duration::days(days as i64));
    }

    let mut columns = Vec::new();
    for col in df.get_columns() {
        let name = col.name().to_string();
        if name == DATE_COLUMN {
            continue;
        }
        if col.dtype() != &DataType::Float64 {
            return Err(SchemaError::TypeMismatch {
                column: name,
                expected: format!("{:?}", DataType::Float64),
                actual: format!("{:?}", col.dtype()),
            });
        }
        let ca = col.f64().map_err(polars_err)?;
        let values = ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        columns.push((name, values));
    }

    Canonicalizer::canonicalize_columns(dates, columns)
}

/// Write a table to a Parquet file.
pub fn write_parquet(table: &TimeSeriesTable, path: &Path) -> Result<(), SchemaError> {
    let mut df = to_dataframe(table)?;
    let file = fs::File::create(path)
        .map_err(|e| SchemaError::Polars(format!("create {}: {e}", path.display())))?;
    ParquetWriter::new(file).finish(&mut df).map_err(polars_err)?;
    Ok(())
}

/// Read a table back from a Parquet file written by [`write_parquet`].
pub fn read_parquet(path: &Path) -> Result<TimeSeriesTable, SchemaError> {
    let file = fs::File::open(path)
        .map_err(|e| SchemaError::Polars(format!("open {}: {e}", path.display())))?;
    let df = ParquetReader::new(file).finish().map_err(polars_err)?;
    from_dataframe(&df)
}
