//! CSV reader.

use std::io::Read;
use std::path::Path;

use crate::error::LoadResult;
use crate::types::{parse_timestamp, DataType, Field, Schema, Table, Value};

/// CSV dialect options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Whether the first record is a header row. Without one, columns are named
    /// `column_1`, `column_2`, ...
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

/// Read a CSV file into an in-memory [`Table`].
///
/// Rules:
///
/// - Every record must have as many fields as the header.
/// - Column kinds are inferred from the non-empty cells: all `true`/`false` → `Bool`, all
///   integers → `Int64`, all numbers → `Float64`, all timestamps → `Timestamp`, else `Utf8`.
///   Surrounding spaces are ignored when parsing, but a whitespace-only cell is text.
/// - Text cells are kept verbatim (including empty strings). Empty cells in typed columns
///   become [`Value::Null`].
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> LoadResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .delimiter(options.delimiter)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> LoadResult<Table> {
    let names: Vec<String> = if rdr.has_headers() {
        rdr.headers()?.iter().map(str::to_owned).collect()
    } else {
        (1..=rdr.headers()?.len()).map(|i| format!("column_{i}")).collect()
    };

    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let kinds: Vec<DataType> = (0..names.len())
        .map(|idx| infer_text_kind(records.iter().map(|r| r.get(idx).unwrap_or(""))))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            kinds
                .iter()
                .enumerate()
                .map(|(idx, kind)| parse_cell(*kind, record.get(idx).unwrap_or("")))
                .collect()
        })
        .collect();

    let fields = names.into_iter().zip(kinds).map(|(n, k)| Field::new(n, k)).collect();
    Ok(Table::new(Schema::new(fields), rows))
}

#[derive(Clone, Copy)]
struct KindCandidates {
    bool: bool,
    int: bool,
    float: bool,
    timestamp: bool,
}

fn infer_text_kind<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let mut c = KindCandidates {
        bool: true,
        int: true,
        float: true,
        timestamp: true,
    };
    let mut any = false;

    for raw in cells {
        if raw.is_empty() {
            continue;
        }
        let s = raw.trim();
        if s.is_empty() {
            return DataType::Utf8;
        }
        any = true;
        c.bool &= parse_bool(s).is_some();
        c.int &= s.parse::<i64>().is_ok();
        c.float &= parse_float(s).is_some();
        c.timestamp &= parse_timestamp(s).is_some();
        if !(c.bool || c.int || c.float || c.timestamp) {
            return DataType::Utf8;
        }
    }

    match (any, c) {
        (false, _) => DataType::Utf8,
        (true, KindCandidates { bool: true, .. }) => DataType::Bool,
        (true, KindCandidates { int: true, .. }) => DataType::Int64,
        (true, KindCandidates { float: true, .. }) => DataType::Float64,
        (true, KindCandidates { timestamp: true, .. }) => DataType::Timestamp,
        _ => DataType::Utf8,
    }
}

fn parse_cell(kind: DataType, raw: &str) -> Value {
    if kind == DataType::Utf8 {
        return Value::Utf8(raw.to_owned());
    }
    if raw.is_empty() {
        return Value::Null;
    }
    let s = raw.trim();

    let parsed = match kind {
        DataType::Bool => parse_bool(s).map(Value::Bool),
        DataType::Int64 => s.parse::<i64>().ok().map(Value::Int64),
        DataType::Float64 => parse_float(s).map(Value::Float64),
        DataType::Timestamp => parse_timestamp(s).map(Value::Timestamp),
        DataType::Utf8 | DataType::Mixed => None,
    };
    parsed.unwrap_or_else(|| Value::Utf8(raw.to_owned()))
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// `f64::from_str` also accepts "inf"/"nan"; a cell needs a digit to count as a number.
fn parse_float(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok()
}
