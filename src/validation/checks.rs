//! Column checks and the two built-in kinds.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;

use crate::types::{parse_timestamp, Column, DataType, Value};

/// A check applied to a single column.
///
/// Each implementation carries its own kind tag; the validator never looks at it beyond
/// reporting, so new kinds plug in without touching existing ones.
pub trait ColumnCheck: fmt::Debug + Send + Sync {
    /// Kind tag (`"numeric"`, `"date"`, ...), matching `check_type` in rule records.
    fn kind(&self) -> &str;

    /// Issues found in `column`.
    ///
    /// The missing-value count is reported by [`super::validate`] for every rule, so checks
    /// should not repeat it.
    fn check(&self, column: Column<'_>) -> Vec<String>;
}

/// Numeric bounds check. Either bound may be open.
///
/// A non-numeric column yields `"Column should be numeric"`; otherwise non-null values strictly
/// outside `[min, max]` are counted. NaN is outside any closed bound.
///
/// `Int64` cells are compared exactly against integral bounds, so values past 2^53 are not
/// rounded onto the bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub const KIND: &'static str = "numeric";

    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Closed range `[min, max]`.
    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min.is_none_or(|m| v >= m) && self.max.is_none_or(|m| v <= m)
    }

    /// Like [`Self::contains`], without widening `v` to `f64` first.
    pub fn contains_int(&self, v: i64) -> bool {
        self.min.is_none_or(|m| cmp_int(v, m).is_some_and(Ordering::is_ge))
            && self.max.is_none_or(|m| cmp_int(v, m).is_some_and(Ordering::is_le))
    }
}

// Exact when `bound` is integral and fits i64; otherwise `v` cannot be misordered by widening.
fn cmp_int(v: i64, bound: f64) -> Option<Ordering> {
    const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if bound.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&bound) {
        Some(v.cmp(&(bound as i64)))
    } else {
        (v as f64).partial_cmp(&bound)
    }
}

impl ColumnCheck for NumericRange {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn check(&self, column: Column<'_>) -> Vec<String> {
        if !column.data_type().is_numeric() {
            return vec!["Column should be numeric".to_string()];
        }
        let outside = column
            .non_null()
            .filter(|v| match v {
                Value::Int64(i) => !self.contains_int(*i),
                Value::Float64(f) => !self.contains(*f),
                _ => false,
            })
            .count();
        out_of_range_issue(outside).into_iter().collect()
    }
}

/// Chronological bounds check. Either bound may be open.
///
/// - `Timestamp` columns are compared directly.
/// - `Utf8` columns have each non-null cell parsed with [`parse_timestamp`]; cells that do not
///   parse are reported as `"Found {n} values that are not valid dates"` and are not counted as
///   out of range.
/// - Any other kind yields `"Column should be a date"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

impl DateRange {
    pub const KIND: &'static str = "date";

    pub fn new(min: Option<NaiveDateTime>, max: Option<NaiveDateTime>) -> Self {
        Self { min, max }
    }

    pub fn between(min: NaiveDateTime, max: NaiveDateTime) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.min.is_none_or(|m| ts >= m) && self.max.is_none_or(|m| ts <= m)
    }
}

impl ColumnCheck for DateRange {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn check(&self, column: Column<'_>) -> Vec<String> {
        match column.data_type() {
            DataType::Timestamp => {
                let outside = column
                    .non_null()
                    .filter_map(Value::as_timestamp)
                    .filter(|ts| !self.contains(*ts))
                    .count();
                out_of_range_issue(outside).into_iter().collect()
            }
            DataType::Utf8 => {
                let mut invalid = 0usize;
                let mut outside = 0usize;
                for v in column.non_null() {
                    match v.as_str().and_then(parse_timestamp) {
                        Some(ts) if !self.contains(ts) => outside += 1,
                        Some(_) => {}
                        None => invalid += 1,
                    }
                }

                let mut issues = Vec::new();
                if invalid > 0 {
                    issues.push(format!("Found {invalid} values that are not valid dates"));
                }
                issues.extend(out_of_range_issue(outside));
                issues
            }
            _ => vec!["Column should be a date".to_string()],
        }
    }
}

fn out_of_range_issue(n: usize) -> Option<String> {
    (n > 0).then(|| format!("Found {n} values outside allowed range"))
}
