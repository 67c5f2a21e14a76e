//! Building checks from external rule records.
//!
//! A rule record is a JSON object with a `check_type` tag plus kind-specific bounds:
//!
//! ```json
//! {
//!   "age":    { "check_type": "numeric", "min_value": 0, "max_value": 130 },
//!   "signup": { "check_type": "date", "min_date": "2020-01-01", "max_date": "2030-12-31 23:59:59" }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::RuleError;
use crate::types::parse_timestamp;

use super::checks::{ColumnCheck, DateRange, NumericRange};

/// Builds a check for `column` from its rule record (the whole JSON object, `check_type`
/// included).
pub type CheckFactory = dyn Fn(&str, &JsonValue) -> Result<Arc<dyn ColumnCheck>, RuleError> + Send + Sync;

/// Maps `check_type` tags to check factories.
///
/// [`CheckRegistry::default`] knows `numeric` and `date`; callers add their own kinds with
/// [`CheckRegistry::register`].
pub struct CheckRegistry {
    factories: HashMap<String, Box<CheckFactory>>,
}

impl CheckRegistry {
    /// A registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str, &JsonValue) -> Result<Arc<dyn ColumnCheck>, RuleError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build the check described by `record` for `column`.
    ///
    /// # Errors
    ///
    /// - [`RuleError::InvalidRule`] if `record` is not an object or lacks a string `check_type`
    /// - [`RuleError::UnknownCheckType`] if no factory is registered for the tag
    /// - whatever the kind's factory reports for malformed bounds
    pub fn build(&self, column: &str, record: &JsonValue) -> Result<Arc<dyn ColumnCheck>, RuleError> {
        let obj = record.as_object().ok_or_else(|| RuleError::InvalidRule {
            column: column.to_string(),
            message: "rule must be a json object".to_string(),
        })?;
        let kind = obj
            .get("check_type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RuleError::InvalidRule {
                column: column.to_string(),
                message: "missing string field 'check_type'".to_string(),
            })?;

        let factory = self.factories.get(kind).ok_or_else(|| RuleError::UnknownCheckType {
            column: column.to_string(),
            check_type: kind.to_string(),
        })?;
        factory(column, record)
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(NumericRange::KIND, numeric_from_record)
            .register(DateRange::KIND, date_from_record);
        registry
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry").field("kinds", &self.kinds()).finish()
    }
}

#[derive(Deserialize)]
struct NumericBounds {
    min_value: Option<f64>,
    max_value: Option<f64>,
}

#[derive(Deserialize)]
struct DateBounds {
    min_date: Option<String>,
    max_date: Option<String>,
}

fn numeric_from_record(column: &str, record: &JsonValue) -> Result<Arc<dyn ColumnCheck>, RuleError> {
    let bounds = NumericBounds::deserialize(record).map_err(|e| invalid_bounds(column, e.to_string()))?;
    if let (Some(min), Some(max)) = (bounds.min_value, bounds.max_value) {
        if min > max {
            return Err(invalid_bounds(
                column,
                format!("min_value {min} is greater than max_value {max}"),
            ));
        }
    }
    Ok(Arc::new(NumericRange::new(bounds.min_value, bounds.max_value)))
}

fn date_from_record(column: &str, record: &JsonValue) -> Result<Arc<dyn ColumnCheck>, RuleError> {
    let bounds = DateBounds::deserialize(record).map_err(|e| invalid_bounds(column, e.to_string()))?;

    let parse = |raw: Option<String>| {
        raw.map(|raw| {
            parse_timestamp(&raw).ok_or_else(|| RuleError::InvalidDate {
                column: column.to_string(),
                raw,
            })
        })
        .transpose()
    };
    let min = parse(bounds.min_date)?;
    let max = parse(bounds.max_date)?;

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(invalid_bounds(column, format!("min_date {lo} is after max_date {hi}")));
        }
    }
    Ok(Arc::new(DateRange::new(min, max)))
}

fn invalid_bounds(column: &str, message: String) -> RuleError {
    RuleError::InvalidBounds {
        column: column.to_string(),
        message,
    }
}
