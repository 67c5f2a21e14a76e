//! Loading tables from files.
//!
//! Most callers should use [`load`] (from [`unified`]) which:
//!
//! - resolves the reader from the file extension (or [`LoadOptions::format`])
//! - reads the file into an in-memory [`crate::types::Table`], inferring column kinds
//! - canonicalizes column names (trimmed, lowercased) and turns empty-string cells into nulls
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! Format-specific readers are also available under [`csv`], [`json`], [`parquet`] and (with the
//! `excel` feature) `excel`. They return the table exactly as read, without the post-processing.

mod columns;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod parquet;
pub mod unified;

pub use columns::{canonical_column_name, canonicalize};
pub use observability::{CompositeObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver};
pub use unified::{load, load_glob, ExcelSheetSelection, LoadOptions, TableFormat};
