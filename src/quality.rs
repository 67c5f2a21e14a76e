//! Quality metrics for a table and comparison against a stored baseline.
//!
//! [`snapshot`] summarises a table; [`diff`] compares two summaries. Snapshots are plain serde
//! values so a caller can persist one run's snapshot and use it as the next run's baseline.
//!
//! ```rust
//! use rust_data_cleaning::quality::{diff, snapshot};
//! use rust_data_cleaning::types::{DataType, Field, Table, Value};
//!
//! let before = Table::from_columns(vec![(
//!     Field::new("age", DataType::Int64),
//!     vec![Value::Int64(30), Value::Null, Value::Int64(41)],
//! )]);
//! let after = before.filter_rows(|row| !row[0].is_null());
//!
//! let delta = diff(&snapshot(&after), &snapshot(&before)).unwrap();
//! assert_eq!(delta.row_count_change, -1);
//! assert_eq!(delta.missing_values_change["age"], -1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QualityError;
use crate::types::{Column, DataType, Table, Value};

/// Descriptive statistics of a numeric column (nulls and NaN ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Summarise `values`, or `None` if there are no non-NaN values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = (count >= 2).then(|| {
            let sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sq / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    fn from_column(column: Column<'_>) -> Option<Self> {
        Self::from_values(column.non_null().filter_map(Value::as_f64))
    }
}

// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Point-in-time quality summary of a table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub row_count: usize,
    /// Null count per column.
    pub missing_values: BTreeMap<String, usize>,
    /// Distinct non-null values per column.
    pub unique_values: BTreeMap<String, usize>,
    /// Declared kind per column.
    pub data_types: BTreeMap<String, DataType>,
    /// Statistics for numeric columns with at least one value.
    pub numeric_stats: BTreeMap<String, NumericSummary>,
}

/// Change between two snapshots (`current - baseline`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityDelta {
    pub row_count_change: i64,
    /// Null-count change for every column of the current snapshot.
    pub missing_values_change: BTreeMap<String, i64>,
}

impl QualityDelta {
    /// `true` when neither the row count nor any null count moved.
    pub fn is_unchanged(&self) -> bool {
        self.row_count_change == 0 && self.missing_values_change.values().all(|d| *d == 0)
    }
}

/// Options for [`diff_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    /// Treat a column missing from the baseline as having had zero nulls instead of failing.
    pub missing_baseline_as_zero: bool,
}

/// Compute a [`QualitySnapshot`] for `table`.
pub fn snapshot(table: &Table) -> QualitySnapshot {
    let mut snap = QualitySnapshot {
        row_count: table.row_count(),
        ..Default::default()
    };

    for column in table.columns() {
        let name = column.name().to_string();
        snap.missing_values.insert(name.clone(), column.null_count());
        snap.unique_values.insert(name.clone(), column.distinct_count());
        snap.data_types.insert(name.clone(), column.data_type());
        if column.data_type().is_numeric() {
            if let Some(summary) = NumericSummary::from_column(column) {
                snap.numeric_stats.insert(name, summary);
            }
        }
    }

    debug!(
        rows = snap.row_count,
        columns = snap.data_types.len(),
        numeric = snap.numeric_stats.len(),
        "quality snapshot"
    );
    snap
}

/// Compare `current` against `baseline`, failing on columns the baseline does not know.
///
/// # Errors
///
/// [`QualityError::BaselineMismatch`] if a column of `current.missing_values` is absent from
/// `baseline.missing_values`.
pub fn diff(current: &QualitySnapshot, baseline: &QualitySnapshot) -> Result<QualityDelta, QualityError> {
    diff_with_options(current, baseline, DiffOptions::default())
}

/// [`diff`] with configurable handling of columns missing from the baseline.
pub fn diff_with_options(
    current: &QualitySnapshot,
    baseline: &QualitySnapshot,
    options: DiffOptions,
) -> Result<QualityDelta, QualityError> {
    let mut missing_values_change = BTreeMap::new();
    for (column, &now) in &current.missing_values {
        let before = match baseline.missing_values.get(column) {
            Some(&before) => before,
            None if options.missing_baseline_as_zero => 0,
            None => {
                return Err(QualityError::BaselineMismatch {
                    column: column.clone(),
                });
            }
        };
        missing_values_change.insert(column.clone(), signed_change(now, before));
    }

    Ok(QualityDelta {
        row_count_change: signed_change(current.row_count, baseline.row_count),
        missing_values_change,
    })
}

fn signed_change(now: usize, before: usize) -> i64 {
    now as i64 - before as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample() -> Table {
        Table::from_columns(vec![
            (
                Field::new("age", DataType::Int64),
                vec![
                    Value::Int64(10),
                    Value::Int64(20),
                    Value::Null,
                    Value::Int64(30),
                    Value::Int64(40),
                ],
            ),
            (
                Field::new("city", DataType::Utf8),
                vec![
                    Value::Utf8("Oslo".into()),
                    Value::Utf8("Oslo".into()),
                    Value::Utf8("Rome".into()),
                    Value::Null,
                    Value::Null,
                ],
            ),
            (Field::new("empty", DataType::Float64), vec![Value::Null; 5]),
        ])
    }

    #[test]
    fn snapshot_counts_per_column() {
        let s = snapshot(&sample());
        assert_eq!(s.row_count, 5);
        assert_eq!(s.missing_values["age"], 1);
        assert_eq!(s.missing_values["city"], 2);
        assert_eq!(s.unique_values["city"], 2);
        assert_eq!(s.unique_values["empty"], 0);
        assert_eq!(s.data_types["city"], DataType::Utf8);
    }

    #[test]
    fn numeric_stats_only_for_numeric_columns_with_values() {
        let s = snapshot(&sample());
        assert_eq!(s.numeric_stats.keys().collect::<Vec<_>>(), vec!["age"]);

        let age = s.numeric_stats["age"];
        assert_eq!(age.count, 4);
        assert!(close(age.mean, 25.0));
        assert!(close(age.std.unwrap(), 12.909944487358056));
        assert!(close(age.min, 10.0));
        assert!(close(age.q25, 17.5));
        assert!(close(age.q50, 25.0));
        assert!(close(age.q75, 32.5));
        assert!(close(age.max, 40.0));
    }

    #[test]
    fn single_value_has_no_std() {
        let s = NumericSummary::from_values([4.0]).unwrap();
        assert_eq!(s.std, None);
        assert!(close(s.q25, 4.0) && close(s.q75, 4.0));
        assert!(NumericSummary::from_values([f64::NAN]).is_none());
    }

    #[test]
    fn diff_reports_row_and_null_changes() {
        let baseline = QualitySnapshot {
            row_count: 100,
            missing_values: BTreeMap::from([("age".to_string(), 2)]),
            ..Default::default()
        };
        let current = QualitySnapshot {
            row_count: 95,
            missing_values: BTreeMap::from([("age".to_string(), 5)]),
            ..Default::default()
        };

        let delta = diff(&current, &baseline).unwrap();
        assert_eq!(delta.row_count_change, -5);
        assert_eq!(delta.missing_values_change, BTreeMap::from([("age".to_string(), 3)]));
        assert!(!delta.is_unchanged());
    }

    #[test]
    fn diff_is_strict_about_unknown_columns_unless_asked() {
        let baseline = QualitySnapshot {
            row_count: 3,
            ..Default::default()
        };
        let current = snapshot(&Table::from_columns(vec![(
            Field::new("new_col", DataType::Int64),
            vec![Value::Null, Value::Int64(1), Value::Int64(2)],
        )]));

        let err = diff(&current, &baseline).unwrap_err();
        assert_eq!(
            err,
            QualityError::BaselineMismatch {
                column: "new_col".to_string()
            }
        );

        let lenient = DiffOptions {
            missing_baseline_as_zero: true,
        };
        let delta = diff_with_options(&current, &baseline, lenient).unwrap();
        assert_eq!(delta.row_count_change, 0);
        assert_eq!(delta.missing_values_change["new_col"], 1);
    }

    #[test]
    fn snapshot_survives_json_round_trip() {
        let s = snapshot(&sample());
        let json = serde_json::to_string(&s).unwrap();
        let back: QualitySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(diff(&back, &s).unwrap().is_unchanged());
    }
}
