#![cfg(feature = "excel")]

//! Excel/workbook reader (feature `excel`).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{LoadError, LoadResult};
use crate::types::{parse_timestamp, Table, Value};

use super::columns::assemble_inferred;

/// Read one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory [`Table`].
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Treats the first non-empty row as the header row
/// - Reads remaining rows; short rows are padded with nulls, cells past the header are ignored
pub fn read_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> LoadResult<Table> {
    let sheets: Option<Vec<&str>> = sheet_name.map(|s| vec![s]);
    read_excel_workbook_from_path(path, sheets.as_deref())
}

/// Read several sheets of a workbook and concatenate all rows into one [`Table`].
///
/// - If `sheet_names` is `None`, reads **all sheets** in workbook order.
/// - If `sheet_names` is `Some(&[...])`, reads only those sheets (in the provided order).
///
/// Every sheet must carry the same header row as the first one.
pub fn read_excel_workbook_from_path(path: impl AsRef<Path>, sheet_names: Option<&[&str]>) -> LoadResult<Table> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names().to_vec(),
    };
    if sheets.is_empty() {
        return Err(LoadError::Malformed {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut header: Option<Vec<String>> = None;
    let mut all_rows: Vec<Vec<Value>> = Vec::new();
    for sheet in &sheets {
        let range = workbook.worksheet_range(sheet)?;
        let (sheet_header, mut sheet_rows) = read_sheet_range(sheet, &range)?;
        match &header {
            None => header = Some(sheet_header),
            Some(first) if *first != sheet_header => {
                return Err(LoadError::Malformed {
                    message: format!(
                        "sheet '{sheet}': header {sheet_header:?} differs from first sheet header {first:?}"
                    ),
                });
            }
            Some(_) => {}
        }
        all_rows.append(&mut sheet_rows);
    }

    Ok(assemble_inferred(header.unwrap_or_default(), all_rows))
}

fn read_sheet_range(sheet: &str, range: &Range<Data>) -> LoadResult<(Vec<String>, Vec<Vec<Value>>)> {
    let header_row_idx = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| LoadError::Malformed {
            message: format!("sheet '{sheet}': no non-empty rows (no header row found)"),
        })?;

    let mut rows_iter = range.rows().skip(header_row_idx);
    let header: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_header_string).collect())
        .unwrap_or_default();

    let rows = rows_iter
        .map(|row| {
            (0..header.len())
                .map(|idx| row.get(idx).map_or(Value::Null, convert_cell))
                .collect()
        })
        .collect();

    Ok((header, rows))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(Value::Float64(dt.as_f64()), Value::Timestamp),
        Data::DateTimeIso(s) => parse_timestamp(s).map_or_else(|| Value::Utf8(s.clone()), Value::Timestamp),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}
