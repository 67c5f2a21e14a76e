//! `rust-data-cleaning` is a small toolkit for cleaning tabular data held in an in-memory
//! [`types::Table`].
//!
//! The usual flow is: [`loader::load`] a file, [`validation::validate`] it against a
//! [`validation::RuleSet`], clean it through a [`pipeline::Pipeline`] of steps, then record a
//! [`quality::snapshot`] and [`quality::diff`] it against the previous run's baseline.
//!
//! ## What you can load
//!
//! **File formats (picked by extension):**
//!
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array of objects or a single object) and `.ndjson` (one object per line)
//! - **Parquet**: `.parquet`, `.pq`
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! No schema is needed: column kinds ([`types::DataType`]) are inferred from the data. Every
//! loaded table has trimmed, lowercased column names, and empty-string cells become
//! [`types::Value::Null`].
//!
//! ```no_run
//! use rust_data_cleaning::loader::{load, LoadOptions};
//!
//! # fn main() -> Result<(), rust_data_cleaning::LoadError> {
//! let table = load("customers.csv", &LoadOptions::default())?;
//! println!("rows={} columns={:?}", table.row_count(), table.column_names().collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```
//!
//! ## Validate, clean, measure
//!
//! ```rust
//! use rust_data_cleaning::pipeline::Pipeline;
//! use rust_data_cleaning::quality::{diff, snapshot};
//! use rust_data_cleaning::steps::{DropDuplicates, DropMissing};
//! use rust_data_cleaning::text::TextNormalizer;
//! use rust_data_cleaning::types::{DataType, Field, Table, Value};
//! use rust_data_cleaning::validation::{validate, RuleSet};
//!
//! let table = Table::from_columns(vec![
//!     (
//!         Field::new("name", DataType::Utf8),
//!         vec![
//!             Value::Utf8("  Ada ".into()),
//!             Value::Utf8("ada".into()),
//!             Value::Utf8("Grace!".into()),
//!             Value::Null,
//!         ],
//!     ),
//!     (
//!         Field::new("age", DataType::Int64),
//!         vec![Value::Int64(36), Value::Int64(36), Value::Int64(-4), Value::Int64(52)],
//!     ),
//! ]);
//!
//! let rules = RuleSet::from_json(r#"{"age": {"check_type": "numeric", "min_value": 0}}"#).unwrap();
//! let report = validate(&table, &rules);
//! assert_eq!(report.issues("age").unwrap(), ["Found 1 values outside allowed range"]);
//!
//! let pipeline = Pipeline::new()
//!     .with_step("drop missing", DropMissing::any_column())
//!     .with_step("normalize", TextNormalizer::all_text())
//!     .with_step("dedupe", DropDuplicates::all_columns());
//! let run = pipeline.execute(&table);
//! assert!(run.succeeded());
//! assert_eq!(run.table.row_count(), 2);
//!
//! let delta = diff(&snapshot(&run.table), &snapshot(&table)).unwrap();
//! assert_eq!(delta.row_count_change, -2);
//! assert_eq!(delta.missing_values_change["name"], -1);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: the table model (schema, values, column views)
//! - [`loader`]: file loading, column canonicalization, load observers
//! - [`validation`]: per-column rules and their results
//! - [`pipeline`]: fail-fast sequential step execution
//! - [`steps`]: built-in cleaning steps
//! - [`text`]: text normalization
//! - [`quality`]: quality snapshots and baseline diffs
//! - [`error`]: error types
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events but never installs a subscriber; that is up to the
//! application.

pub mod error;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod steps;
pub mod text;
pub mod types;
pub mod validation;

pub use error::{LoadError, LoadResult, QualityError, RuleError, StepError, StepExecutionError, StepResult};
pub use loader::{load, load_glob, LoadOptions};
pub use pipeline::{Pipeline, PipelineRun, StepOutcome, StepStatus, Transform};
pub use quality::{diff, snapshot, QualityDelta, QualitySnapshot};
pub use text::normalize_text;
pub use types::{DataType, Field, Schema, Table, Value};
pub use validation::{validate, RuleSet, ValidationResult, ValidationRule};
