//! Tabular artifacts: signals (CSV/Parquet), fills and attribution (CSV).

use anyhow::{Context, Result};
use std::path::Path;

use creditlab_core::attribution::AttributionRow;
use creditlab_core::data::{write_parquet, TimeSeriesTable, DATE_COLUMN};
use creditlab_core::domain::Fill;

/// Missing values are written as empty cells.
fn cell(v: f64) -> String {
    if v.is_finite() {
        format!("{v}")
    } else {
        String::new()
    }
}

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// `date` followed by every column of the table, in table order.
pub fn write_signals_csv(path: &Path, table: &TimeSeriesTable) -> Result<()> {
    let mut wtr = create_writer(path)?;
    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(table.column_names().iter().cloned());
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = table.columns().map(|(_, values)| values).collect();
    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(columns.iter().map(|col| cell(col[row])));
        wtr.write_record(&record)?;
    }
    wtr.flush().context("failed to flush signals CSV")?;
    Ok(())
}

pub fn write_signals_parquet(path: &Path, table: &TimeSeriesTable) -> Result<()> {
    write_parquet(table, path)
        .with_context(|| format!("Failed to write signals parquet {}", path.display()))
}

pub fn write_fills_csv(path: &Path, fills: &[Fill]) -> Result<()> {
    let mut wtr = create_writer(path)?;
    wtr.write_record(["timestamp", "symbol", "price", "shares", "mid"])?;
    for f in fills {
        wtr.write_record([
            &f.timestamp.to_rfc3339(),
            &f.symbol,
            &format!("{:.6}", f.price),
            &f.shares.to_string(),
            &format!("{:.6}", f.mid),
        ])?;
    }
    wtr.flush().context("failed to flush fills CSV")?;
    Ok(())
}

/// One row per attributed fill, with the running total.
pub fn write_attribution_csv(
    path: &Path,
    rows: &[AttributionRow],
    cumulative: &[f64],
) -> Result<()> {
    let mut wtr = create_writer(path)?;
    wtr.write_record(["timestamp", "execution", "market", "total", "cumulative"])?;
    for (row, running) in rows.iter().zip(cumulative) {
        wtr.write_record([
            &row.timestamp.to_rfc3339(),
            &format!("{:.6}", row.execution),
            &format!("{:.6}", row.market),
            &format!("{:.6}", row.total()),
            &format!("{:.6}", running),
        ])?;
    }
    wtr.flush().context("failed to flush attribution CSV")?;
    Ok(())
}
