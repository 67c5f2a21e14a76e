//! Rule-based column validation.
//!
//! A [`RuleSet`] maps column names to one [`ValidationRule`] each. [`validate`] evaluates every
//! rule whose column exists in the table and returns a [`ValidationResult`] of human-readable
//! issues per column. Issues are data, not errors: validation itself never fails.
//!
//! ```rust
//! use rust_data_cleaning::types::{DataType, Field, Table, Value};
//! use rust_data_cleaning::validation::{validate, RuleSet, ValidationRule};
//!
//! let table = Table::from_columns(vec![(
//!     Field::new("age", DataType::Int64),
//!     vec![Value::Int64(5), Value::Int64(-1), Value::Int64(2_000_000), Value::Null],
//! )]);
//! let rules = RuleSet::new().with_rule(ValidationRule::numeric("age", Some(0.0), Some(1_000_000.0)));
//!
//! let result = validate(&table, &rules);
//! assert_eq!(
//!     result.issues("age").unwrap(),
//!     ["Found 1 missing values", "Found 2 values outside allowed range"]
//! );
//! ```

mod checks;
mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info};

use crate::error::RuleError;
use crate::types::Table;

pub use checks::{ColumnCheck, DateRange, NumericRange};
pub use registry::{CheckFactory, CheckRegistry};

/// A check bound to a column name.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    column: String,
    check: Arc<dyn ColumnCheck>,
}

impl ValidationRule {
    pub fn new(column: impl Into<String>, check: impl ColumnCheck + 'static) -> Self {
        Self::from_arc(column, Arc::new(check))
    }

    pub fn from_arc(column: impl Into<String>, check: Arc<dyn ColumnCheck>) -> Self {
        Self {
            column: column.into(),
            check,
        }
    }

    /// Numeric range rule; `None` leaves that side open.
    pub fn numeric(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(column, NumericRange::new(min, max))
    }

    /// Date range rule; `None` leaves that side open.
    pub fn date(column: impl Into<String>, min: Option<NaiveDateTime>, max: Option<NaiveDateTime>) -> Self {
        Self::new(column, DateRange::new(min, max))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Kind tag of the underlying check.
    pub fn kind(&self) -> &str {
        self.check.kind()
    }

    pub fn check(&self) -> &dyn ColumnCheck {
        self.check.as_ref()
    }
}

/// Validation rules keyed by column name (at most one rule per column).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, ValidationRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule for the same column.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.insert(rule);
        self
    }

    /// Add a rule; returns the rule it replaced, if any.
    pub fn insert(&mut self, rule: ValidationRule) -> Option<ValidationRule> {
        self.rules.insert(rule.column.clone(), rule)
    }

    pub fn get(&self, column: &str) -> Option<&ValidationRule> {
        self.rules.get(column)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationRule> {
        self.rules.values()
    }

    /// Parse rule records (`{ "<column>": { "check_type": .., <bounds> } }`) with the built-in
    /// check kinds.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] for invalid JSON, unknown `check_type` tags, and malformed bounds.
    pub fn from_json(input: &str) -> Result<Self, RuleError> {
        Self::from_json_with(input, &CheckRegistry::default())
    }

    /// Like [`RuleSet::from_json`], resolving `check_type` tags through `registry`.
    pub fn from_json_with(input: &str, registry: &CheckRegistry) -> Result<Self, RuleError> {
        let records: Map<String, JsonValue> = serde_json::from_str(input)?;
        let mut rules = Self::new();
        for (column, record) in &records {
            let check = registry.build(column, record)?;
            rules.insert(ValidationRule::from_arc(column.as_str(), check));
        }
        Ok(rules)
    }
}

/// Issues per validated column.
///
/// Every rule column present in the table has an entry; an empty list means "checked, no
/// issues". Columns that were not checked have no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    issues: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    /// Issues for `column`, or `None` if it was not checked.
    pub fn issues(&self, column: &str) -> Option<&[String]> {
        self.issues.get(column).map(Vec::as_slice)
    }

    pub fn was_checked(&self, column: &str) -> bool {
        self.issues.contains_key(column)
    }

    /// Number of checked columns.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `true` when no checked column reported an issue.
    pub fn is_clean(&self) -> bool {
        self.issues.values().all(Vec::is_empty)
    }

    /// Total number of issues across all columns.
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.issues.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.issues
    }
}

/// Validate `table` against `rules`.
///
/// For each rule whose column is present (absent columns are skipped):
///
/// 1. `"Found {n} missing values"` when the column has `n > 0` nulls
/// 2. whatever the rule's [`ColumnCheck`] reports
pub fn validate(table: &Table, rules: &RuleSet) -> ValidationResult {
    let mut issues = BTreeMap::new();

    for rule in rules.iter() {
        let Some(column) = table.column(rule.column()) else {
            debug!(column = rule.column(), kind = rule.kind(), "column absent; rule skipped");
            continue;
        };

        let mut found = Vec::new();
        let missing = column.null_count();
        if missing > 0 {
            found.push(format!("Found {missing} missing values"));
        }
        found.extend(rule.check().check(column));

        issues.insert(rule.column().to_string(), found);
    }

    let result = ValidationResult { issues };
    info!(
        rules = rules.len(),
        checked = result.len(),
        issues = result.issue_count(),
        "validation finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Value};

    fn people() -> Table {
        Table::from_columns(vec![
            (
                Field::new("age", DataType::Int64),
                vec![Value::Int64(5), Value::Int64(-1), Value::Int64(2_000_000), Value::Null],
            ),
            (
                Field::new("name", DataType::Utf8),
                vec![
                    Value::Utf8("a".into()),
                    Value::Utf8("b".into()),
                    Value::Utf8("c".into()),
                    Value::Utf8("d".into()),
                ],
            ),
            (
                Field::new("signup", DataType::Utf8),
                vec![
                    Value::Utf8("2021-05-01".into()),
                    Value::Null,
                    Value::Utf8("2019-01-01".into()),
                    Value::Utf8("2022-02-02".into()),
                ],
            ),
        ])
    }

    #[test]
    fn reports_missing_and_out_of_range_counts() {
        let rules = RuleSet::new().with_rule(ValidationRule::numeric("age", Some(0.0), Some(1_000_000.0)));
        let result = validate(&people(), &rules);
        assert_eq!(
            result.issues("age").unwrap(),
            ["Found 1 missing values", "Found 2 values outside allowed range"]
        );
    }

    #[test]
    fn absent_columns_are_skipped_and_clean_columns_get_empty_entries() {
        let rules = RuleSet::new()
            .with_rule(ValidationRule::numeric("height", Some(0.0), None))
            .with_rule(ValidationRule::numeric("age", None, None));
        let result = validate(&people(), &rules);

        assert!(!result.was_checked("height"));
        assert_eq!(result.issues("age").unwrap(), ["Found 1 missing values"]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn text_column_under_numeric_rule() {
        let rules = RuleSet::new().with_rule(ValidationRule::numeric("name", Some(0.0), Some(1.0)));
        let result = validate(&people(), &rules);
        assert_eq!(result.issues("name").unwrap(), ["Column should be numeric"]);
    }

    #[test]
    fn rules_from_json() {
        let rules = RuleSet::from_json(
            r#"{
                "age": {"check_type": "numeric", "min_value": 0, "max_value": 1000000},
                "signup": {"check_type": "date", "min_date": "2020-01-01"},
                "name": {"check_type": "numeric"}
            }"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get("signup").unwrap().kind(), "date");

        let result = validate(&people(), &rules);
        assert_eq!(
            result.issues("signup").unwrap(),
            ["Found 1 missing values", "Found 1 values outside allowed range"]
        );
        assert_eq!(result.issues("name").unwrap(), ["Column should be numeric"]);
        assert_eq!(result.issue_count(), 6);
        assert!(!result.is_clean());
    }

    #[derive(Debug)]
    struct NonEmptyText;

    impl ColumnCheck for NonEmptyText {
        fn kind(&self) -> &str {
            "non_empty_text"
        }

        fn check(&self, column: crate::types::Column<'_>) -> Vec<String> {
            let blank = column
                .non_null()
                .filter(|v| v.as_str().is_some_and(|s| s.trim().is_empty()))
                .count();
            if blank > 0 {
                vec![format!("Found {blank} blank values")]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn custom_kinds_register_without_touching_builtins() {
        let mut registry = CheckRegistry::default();
        registry.register("non_empty_text", |_column: &str, _record: &JsonValue| {
            Ok(Arc::new(NonEmptyText) as Arc<dyn ColumnCheck>)
        });

        let rules = RuleSet::from_json_with(r#"{"name": {"check_type": "non_empty_text"}}"#, &registry).unwrap();
        let result = validate(&people(), &rules);
        assert_eq!(result.issues("name"), Some(&[][..]));
        assert!(result.is_clean());
    }

    #[test]
    fn result_serializes_as_plain_map() {
        let rules = RuleSet::new().with_rule(ValidationRule::numeric("age", Some(0.0), None));
        let result = validate(&people(), &rules);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"age": ["Found 1 missing values", "Found 1 values outside allowed range"]})
        );
        let back: ValidationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
