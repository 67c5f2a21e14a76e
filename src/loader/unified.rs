//! Unified load entrypoint.
//!
//! - If [`LoadOptions::format`] is `None`, the reader is chosen from the file extension.
//! - Whatever the reader, the result goes through [`super::canonicalize`].
//! - If a [`super::observability::LoadObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{LoadError, LoadResult};
use crate::types::Table;

use super::canonicalize;
use super::csv::CsvOptions;
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::{csv, json, parquet};

/// Supported table source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    /// Delimited text.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
    /// Spreadsheet/workbook formats (reader feature-gated behind `excel`).
    Excel,
}

/// Extension → format lookup table. Extensions are matched case-insensitively.
const EXTENSIONS: &[(&str, TableFormat)] = &[
    ("csv", TableFormat::Csv),
    ("json", TableFormat::Json),
    ("ndjson", TableFormat::Json),
    ("parquet", TableFormat::Parquet),
    ("pq", TableFormat::Parquet),
    ("xlsx", TableFormat::Excel),
    ("xls", TableFormat::Excel),
    ("xlsm", TableFormat::Excel),
    ("xlsb", TableFormat::Excel),
    ("ods", TableFormat::Excel),
];

impl TableFormat {
    /// Look up the format registered for a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(registered, _)| *registered == ext)
            .map(|(_, format)| *format)
    }

    /// Resolve the format for `path` from its extension.
    ///
    /// Fails with [`LoadError::UnsupportedFormat`] when the path has no extension or the
    /// extension has no registered reader.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext.to_string(),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Excel => "excel",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to choose sheet(s) when loading an Excel workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExcelSheetSelection {
    /// Load the first sheet (default).
    #[default]
    First,
    /// Load a single named sheet.
    Sheet(String),
    /// Load all sheets and concatenate rows.
    AllSheets,
    /// Load only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Options controlling [`load`].
///
/// Use [`Default`] for common cases. Reader-specific fields are ignored by the other readers.
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, resolve the format from the file extension.
    pub format: Option<TableFormat>,
    /// CSV dialect.
    pub csv: CsvOptions,
    /// Excel-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("csv", &self.csv)
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            csv: CsvOptions::default(),
            excel_sheet_selection: ExcelSheetSelection::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load a file into a [`Table`].
///
/// The reader is picked from `options.format`, or from the file extension when that is `None`
/// (`.csv`, `.json`/`.ndjson`, `.parquet`/`.pq`, `.xlsx`/`.xls`/`.xlsm`/`.xlsb`/`.ods`). The
/// table it returns is then [canonicalized](super::canonicalize): column names are trimmed and
/// lowercased, and empty-string cells become nulls.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Errors
///
/// - [`LoadError::UnsupportedFormat`] if no reader is registered for the extension
/// - [`LoadError::FormatDisabled`] for Excel files when the `excel` feature is off
/// - [`LoadError::DuplicateColumnName`] if two columns share a canonical name
/// - reader errors (I/O, CSV, JSON, Parquet, Excel, malformed input)
///
/// # Examples
///
/// ```no_run
/// use rust_data_cleaning::loader::{load, LoadOptions};
///
/// # fn main() -> Result<(), rust_data_cleaning::LoadError> {
/// let table = load("people.csv", &LoadOptions::default())?;
/// println!("rows={} columns={}", table.row_count(), table.column_count());
/// # Ok(())
/// # }
/// ```
///
/// Force a format (e.g. for a file without an extension) and log through `tracing`:
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rust_data_cleaning::loader::{load, LoadOptions, TableFormat, TracingObserver};
///
/// # fn main() -> Result<(), rust_data_cleaning::LoadError> {
/// let opts = LoadOptions {
///     format: Some(TableFormat::Csv),
///     observer: Some(Arc::new(TracingObserver)),
///     ..Default::default()
/// };
/// let table = load("export_without_extension", &opts)?;
/// # let _ = table;
/// # Ok(())
/// # }
/// ```
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Table> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => TableFormat::from_path(path)?,
    };

    let ctx = LoadContext {
        path: path.to_path_buf(),
        format,
    };
    debug!(path = %path.display(), %format, "loading table");

    let result = read_format(path, format, options).and_then(canonicalize);

    match &result {
        Ok(table) => info!(
            path = %path.display(),
            %format,
            rows = table.row_count(),
            columns = table.column_count(),
            "table loaded"
        ),
        Err(e) => debug!(path = %path.display(), %format, error = %e, "table load failed"),
    }

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(table) => obs.on_success(
                &ctx,
                LoadStats {
                    rows: table.row_count(),
                    columns: table.column_count(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Load every file matching a glob pattern, in sorted path order.
///
/// Each file goes through [`load`] with the same options; the first failure aborts the batch.
/// A pattern that matches nothing yields an empty list.
pub fn load_glob(pattern: &str, options: &LoadOptions) -> LoadResult<Vec<(PathBuf, Table)>> {
    let mut paths = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    debug!(pattern, matched = paths.len(), "loading glob");

    paths
        .into_iter()
        .map(|path| {
            let table = load(&path, options)?;
            Ok((path, table))
        })
        .collect()
}

fn read_format(path: &Path, format: TableFormat, options: &LoadOptions) -> LoadResult<Table> {
    match format {
        TableFormat::Csv => csv::read_csv_from_path(path, &options.csv),
        TableFormat::Json => json::read_json_from_path(path),
        TableFormat::Parquet => parquet::read_parquet_from_path(path),
        TableFormat::Excel => read_excel_dispatch(path, &options.excel_sheet_selection),
    }
}

fn severity_for_error(e: &LoadError) -> LoadSeverity {
    match e {
        LoadError::Io(_) | LoadError::Glob(_) => LoadSeverity::Critical,
        LoadError::Parquet(err) => {
            // Parquet errors wrap I/O only through the source chain.
            if error_chain_contains_io(err) {
                LoadSeverity::Critical
            } else {
                LoadSeverity::Error
            }
        }
        LoadError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        LoadError::Json(err) if err.is_io() => LoadSeverity::Critical,
        #[cfg(feature = "excel")]
        LoadError::Excel(calamine::Error::Io(_)) => LoadSeverity::Critical,
        _ => LoadSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn read_excel_dispatch(path: &Path, sel: &ExcelSheetSelection) -> LoadResult<Table> {
    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            ExcelSheetSelection::First => excel::read_excel_from_path(path, None),
            ExcelSheetSelection::Sheet(name) => excel::read_excel_from_path(path, Some(name.as_str())),
            ExcelSheetSelection::AllSheets => excel::read_excel_workbook_from_path(path, None),
            ExcelSheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                excel::read_excel_workbook_from_path(path, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (path, sel);
        Err(LoadError::FormatDisabled {
            format: TableFormat::Excel,
            feature: "excel",
        })
    }
}
