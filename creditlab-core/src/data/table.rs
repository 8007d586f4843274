//! TimeSeriesTable: date-indexed, column-oriented numeric table.
//!
//! Missing values are stored as NaN. The date index is strictly increasing;
//! every constructor enforces it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schema::SchemaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    /// `values[c][r]` is column `c` at row `r`.
    values: Vec<Vec<f64>>,
}

impl TimeSeriesTable {
    /// Build a table from an ordered date index and named columns.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, SchemaError> {
        check_strictly_increasing(&dates)?;

        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, col) in columns {
            if names.contains(&name) {
                return Err(SchemaError::DuplicateColumn(name));
            }
            if col.len() != dates.len() {
                return Err(SchemaError::LengthMismatch {
                    column: name,
                    expected: dates.len(),
                    actual: col.len(),
                });
            }
            names.push(name);
            values.push(col);
        }

        Ok(Self {
            dates,
            names,
            values,
        })
    }

    /// A table with the given columns and no rows.
    pub fn empty(names: Vec<String>) -> Self {
        let values = vec![Vec::new(); names.len()];
        Self {
            dates: Vec::new(),
            names,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Like [`column`](Self::column) but a missing column is a schema error.
    pub fn require(&self, name: &str) -> Result<&[f64], SchemaError> {
        self.column(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|c| c.get(row).copied())
    }

    /// Iterate columns as `(name, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Add a column, or replace an existing one with the same name.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        col: Vec<f64>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if col.len() != self.len() {
            return Err(SchemaError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: col.len(),
            });
        }
        match self.names.iter().position(|n| *n == name) {
            Some(i) => self.values[i] = col,
            None => {
                self.names.push(name);
                self.values.push(col);
            }
        }
        Ok(self)
    }

    /// Carry the last observed value forward over NaN gaps, per column.
    ///
    /// Leading NaNs (before the first observation) stay NaN.
    pub fn forward_fill(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|col| {
                let mut last = f64::NAN;
                col.iter()
                    .map(|&v| {
                        if v.is_nan() {
                            last
                        } else {
                            last = v;
                            v
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            names: self.names.clone(),
            values,
        }
    }

    /// Whether every column has a defined value at `row`.
    pub fn row_is_complete(&self, row: usize) -> bool {
        self.values.iter().all(|col| col[row].is_finite())
    }

    /// Drop every row with a missing (NaN or infinite) value in any column.
    pub fn drop_incomplete(&self) -> Self {
        let keep: Vec<bool> = (0..self.len()).map(|r| self.row_is_complete(r)).collect();
        self.filter_rows(&keep)
    }

    /// Keep only the rows whose mask entry is true.
    ///
    /// # Panics
    /// If `keep` is not exactly one entry per row.
    pub fn filter_rows(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.len(), "row mask length mismatch");
        let pick = |v: &Vec<f64>| -> Vec<f64> {
            v.iter()
                .zip(keep)
                .filter_map(|(x, &k)| k.then_some(*x))
                .collect()
        };
        Self {
            dates: self
                .dates
                .iter()
                .zip(keep)
                .filter_map(|(d, &k)| k.then_some(*d))
                .collect(),
            names: self.names.clone(),
            values: self.values.iter().map(pick).collect(),
        }
    }

    /// Restrict to rows whose date falls in `[start, end]`.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let keep: Vec<bool> = self.dates.iter().map(|d| *d >= start && *d <= end).collect();
        self.filter_rows(&keep)
    }

    /// Project onto a subset of columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self, SchemaError> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            cols.push((name.to_string(), self.require(name)?.to_vec()));
        }
        Self::new(self.dates.clone(), cols)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

fn check_strictly_increasing(dates: &[NaiveDate]) -> Result<(), SchemaError> {
    for (i, pair) in dates.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(SchemaError::NonMonotonicDates {
                index: i + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}
