//! Post-read column handling shared by every reader.

use std::collections::HashMap;

use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, Field, Schema, Table, Value};

/// Canonical form of a column name: surrounding whitespace trimmed, lowercased.
pub fn canonical_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Apply the loader's two post-processing rules to a freshly read table.
///
/// - Column names are replaced by their [`canonical_column_name`]. Two names that collapse to the
///   same canonical form fail with [`LoadError::DuplicateColumnName`].
/// - Every `Utf8("")` cell becomes [`Value::Null`]. A `Mixed` column that lost such a cell has
///   its kind re-derived, so `[5, "", -1]` ends up `Int64`.
///
/// Nothing else about the content changes, so applying this twice is the same as applying it once.
pub fn canonicalize(mut table: Table) -> LoadResult<Table> {
    let mut seen: HashMap<String, String> = HashMap::with_capacity(table.schema.len());
    for field in &mut table.schema.fields {
        let canonical = canonical_column_name(&field.name);
        if let Some(first) = seen.get(&canonical) {
            return Err(LoadError::DuplicateColumnName {
                canonical,
                first: first.clone(),
                second: field.name.clone(),
            });
        }
        seen.insert(canonical.clone(), field.name.clone());
        field.name = canonical;
    }

    let mut nulled = vec![false; table.column_count()];
    for row in &mut table.rows {
        for (idx, cell) in row.iter_mut().enumerate() {
            if matches!(cell, Value::Utf8(s) if s.is_empty()) {
                *cell = Value::Null;
                nulled[idx] = true;
            }
        }
    }

    // Only a Mixed column can hold an empty string next to non-text cells.
    for (idx, _) in nulled.iter().enumerate().filter(|(_, n)| **n) {
        if table.schema.fields[idx].data_type == DataType::Mixed {
            table.reinfer_column(idx);
        }
    }

    Ok(table)
}

/// Build a table from reader output whose column kinds are not known up front.
///
/// Each column's kind comes from [`Table::reinfer_column`].
pub(crate) fn assemble_inferred(names: Vec<String>, rows: Vec<Vec<Value>>) -> Table {
    let fields = names.into_iter().map(|n| Field::new(n, DataType::Mixed)).collect();
    let mut table = Table::new(Schema::new(fields), rows);
    for idx in 0..table.column_count() {
        table.reinfer_column(idx);
    }
    table
}
