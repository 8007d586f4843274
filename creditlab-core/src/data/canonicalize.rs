//! Canonicalization: sort, dedupe, merge and gap handling for raw series.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

use super::schema::SchemaError;
use super::table::TimeSeriesTable;

/// Canonicalizer for merged market/macro data
pub struct Canonicalizer;

impl Canonicalizer {
    /// Canonicalize a lazy frame: sort by date, dedupe keeping the first row per date.
    pub fn canonicalize(df: LazyFrame) -> LazyFrame {
        df.sort(
            ["date"],
            SortMultipleOptions::default()
                .with_order_descending(false)
                .with_maintain_order(true),
        )
        .unique_stable(Some(vec!["date".into()]), UniqueKeepStrategy::First)
    }

    /// Canonicalize unsorted columnar data into a table.
    ///
    /// Rows are stably sorted by date; for repeated dates the first occurrence
    /// in input order wins.
    pub fn canonicalize_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<TimeSeriesTable, SchemaError> {
        for (name, col) in &columns {
            if col.len() != dates.len() {
                return Err(SchemaError::LengthMismatch {
                    column: name.clone(),
                    expected: dates.len(),
                    actual: col.len(),
                });
            }
        }

        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);
        order.dedup_by_key(|i| dates[*i]);

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let sorted_cols = columns
            .into_iter()
            .map(|(name, col)| (name, order.iter().map(|&i| col[i]).collect()))
            .collect();
        TimeSeriesTable::new(sorted_dates, sorted_cols)
    }

    /// Outer-join several tables on the union of their dates.
    ///
    /// A source without an observation on a date contributes NaN there.
    /// Column names must be unique across sources.
    pub fn merge(sources: &[&TimeSeriesTable]) -> Result<TimeSeriesTable, SchemaError> {
        let dates: Vec<NaiveDate> = sources
            .iter()
            .flat_map(|t| t.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns = Vec::new();
        for source in sources {
            let row_of: HashMap<NaiveDate, usize> = source
                .dates()
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, i))
                .collect();
            for (name, values) in source.columns() {
                let aligned = dates
                    .iter()
                    .map(|d| row_of.get(d).map_or(f64::NAN, |&r| values[r]))
                    .collect();
                columns.push((name.to_string(), aligned));
            }
        }

        TimeSeriesTable::new(dates, columns)
    }

    /// Forward-fill gaps, then drop rows that are still incomplete.
    ///
    /// This is the state every downstream component expects its input in.
    pub fn prepare(table: &TimeSeriesTable) -> TimeSeriesTable {
        table.forward_fill().drop_incomplete()
    }

    /// Detect data-quality anomalies worth surfacing to the user.
    pub fn detect_anomalies(table: &TimeSeriesTable) -> Vec<AnomalyReport> {
        let mut anomalies = Vec::new();

        for (name, col) in table.columns() {
            let missing = col.iter().filter(|v| !v.is_finite()).count();
            if missing > 0 {
                anomalies.push(AnomalyReport {
                    column: name.to_string(),
                    anomaly_type: AnomalyType::MissingValues,
                    count: missing,
                    severity: if missing == col.len() {
                        Severity::Error
                    } else {
                        Severity::Warning
                    },
                });
            }

            let stale = longest_constant_run(col);
            if stale >= STALE_RUN_THRESHOLD {
                anomalies.push(AnomalyReport {
                    column: name.to_string(),
                    anomaly_type: AnomalyType::StaleSeries,
                    count: stale,
                    severity: Severity::Info,
                });
            }
        }

        anomalies
    }
}

/// Runs of identical consecutive values at least this long are flagged as stale.
const STALE_RUN_THRESHOLD: usize = 20;

fn longest_constant_run(col: &[f64]) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<f64> = None;
    for &v in col {
        if v.is_finite() && prev == Some(v) {
            run += 1;
        } else {
            run = usize::from(v.is_finite());
        }
        best = best.max(run);
        prev = Some(v);
    }
    best
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnomalyReport {
    pub column: String,
    pub anomaly_type: AnomalyType,
    pub count: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    MissingValues,
    StaleSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n)
    }

    #[test]
    fn test_canonicalize_sorts_data() {
        let df = df!(
            "date" => &[3i32, 1, 2],
            "vix" => &[20.0, 18.0, 19.0],
        )
        .unwrap();

        let sorted = Canonicalizer::canonicalize(df.lazy()).collect().unwrap();
        let dates = sorted.column("date").unwrap().i32().unwrap();

        assert_eq!(dates.get(0), Some(1));
        assert_eq!(dates.get(1), Some(2));
        assert_eq!(dates.get(2), Some(3));
    }

    #[test]
    fn test_canonicalize_removes_duplicates() {
        let df = df!(
            "date" => &[1i32, 1, 2],
            "vix" => &[18.0, 99.0, 19.0],
        )
        .unwrap();

        let deduped = Canonicalizer::canonicalize(df.lazy()).collect().unwrap();

        assert_eq!(deduped.height(), 2);
        let vix = deduped.column("vix").unwrap().f64().unwrap();
        assert_eq!(vix.get(0), Some(18.0));
    }

    #[test]
    fn canonicalize_columns_sorts_and_keeps_first() {
        let table = Canonicalizer::canonicalize_columns(
            vec![day(2), day(0), day(2), day(1)],
            vec![("x".into(), vec![2.0, 0.0, 99.0, 1.0])],
        )
        .unwrap();
        assert_eq!(table.dates(), &[day(0), day(1), day(2)]);
        assert_eq!(table.column("x").unwrap(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn merge_aligns_on_union_of_dates() {
        let prices = TimeSeriesTable::new(
            vec![day(0), day(1), day(2)],
            vec![("LQD".into(), vec![110.0, 111.0, 112.0])],
        )
        .unwrap();
        let macro_ = TimeSeriesTable::new(
            vec![day(1), day(3)],
            vec![("vix".into(), vec![20.0, 22.0])],
        )
        .unwrap();

        let merged = Canonicalizer::merge(&[&prices, &macro_]).unwrap();
        assert_eq!(merged.len(), 4);
        let vix = merged.column("vix").unwrap();
        assert!(vix[0].is_nan());
        assert_eq!(vix[1], 20.0);
        assert!(vix[2].is_nan());
        assert!(merged.column("LQD").unwrap()[3].is_nan());
    }

    #[test]
    fn merge_rejects_overlapping_columns() {
        let a = TimeSeriesTable::new(vec![day(0)], vec![("vix".into(), vec![1.0])]).unwrap();
        let b = TimeSeriesTable::new(vec![day(1)], vec![("vix".into(), vec![2.0])]).unwrap();
        assert!(matches!(
            Canonicalizer::merge(&[&a, &b]),
            Err(SchemaError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn prepare_fills_interior_gaps_and_drops_leading() {
        let prices = TimeSeriesTable::new(
            vec![day(0), day(1), day(2)],
            vec![("LQD".into(), vec![110.0, 111.0, 112.0])],
        )
        .unwrap();
        let macro_ = TimeSeriesTable::new(
            vec![day(1), day(3)],
            vec![("vix".into(), vec![20.0, 22.0])],
        )
        .unwrap();
        let merged = Canonicalizer::merge(&[&prices, &macro_]).unwrap();
        let ready = Canonicalizer::prepare(&merged);

        assert_eq!(ready.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(ready.column("vix").unwrap(), &[20.0, 20.0, 22.0]);
        assert_eq!(ready.column("LQD").unwrap(), &[111.0, 112.0, 112.0]);
    }

    #[test]
    fn detect_anomalies_flags_missing_and_stale() {
        let n = 25;
        let dates = (0..n).map(day).collect();
        let mut gappy = vec![1.0; n as usize];
        gappy[3] = f64::NAN;
        let table = TimeSeriesTable::new(
            dates,
            vec![
                ("flat".into(), vec![5.0; n as usize]),
                ("gappy".into(), gappy),
            ],
        )
        .unwrap();

        let anomalies = Canonicalizer::detect_anomalies(&table);
        assert!(anomalies
            .iter()
            .any(|a| a.column == "flat" && a.anomaly_type == AnomalyType::StaleSeries));
        let missing = anomalies
            .iter()
            .find(|a| a.anomaly_type == AnomalyType::MissingValues)
            .unwrap();
        assert_eq!(missing.column, "gappy");
        assert_eq!(missing.count, 1);
        assert_eq!(missing.severity, Severity::Warning);
    }
}
