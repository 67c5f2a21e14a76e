//! Built-in cleaning steps for [`crate::pipeline::Pipeline`].
//!
//! ```rust
//! use rust_data_cleaning::pipeline::Pipeline;
//! use rust_data_cleaning::steps::{DropDuplicates, DropMissing, FillMissing};
//! use rust_data_cleaning::text::TextNormalizer;
//! use rust_data_cleaning::types::Value;
//!
//! let pipeline = Pipeline::new()
//!     .with_step("fill country", FillMissing::new("country", Value::Utf8("unknown".into())))
//!     .with_step("drop rows without id", DropMissing::columns(["id"]))
//!     .with_step("normalize text", TextNormalizer::all_text())
//!     .with_step("dedupe", DropDuplicates::all_columns());
//! assert_eq!(pipeline.len(), 4);
//! ```

use std::collections::HashSet;

use crate::error::{StepError, StepResult};
use crate::pipeline::Transform;
use crate::types::{Table, Value};

/// Drop rows holding a null in any of the selected columns (all columns by default).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropMissing {
    columns: Option<Vec<String>>,
}

impl DropMissing {
    pub fn any_column() -> Self {
        Self::default()
    }

    /// Only nulls in these columns drop a row. Every name must exist in the table.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }
}

impl Transform for DropMissing {
    fn apply(&self, table: &Table) -> StepResult<Table> {
        let indexes = resolve_columns(table, self.columns.as_deref())?;
        Ok(table.filter_rows(|row| indexes.iter().all(|&i| !row[i].is_null())))
    }
}

/// Replace nulls in one column with a fixed value.
///
/// The column's kind is re-derived afterwards, so filling an `Int64` column with a float widens
/// it to `Float64`, and filling it with text makes it `Mixed`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillMissing {
    column: String,
    value: Value,
}

impl FillMissing {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

impl Transform for FillMissing {
    fn apply(&self, table: &Table) -> StepResult<Table> {
        let idx = table
            .schema
            .index_of(&self.column)
            .ok_or_else(|| StepError::MissingColumn(self.column.clone()))?;

        let mut out = table.clone();
        if self.value.is_null() || out.column(&self.column).is_none_or(|c| c.null_count() == 0) {
            return Ok(out);
        }

        let kind = out.schema.fields[idx].data_type;
        out.update_column(idx, kind, |v| if v.is_null() { self.value.clone() } else { v.clone() });
        out.reinfer_column(idx);
        Ok(out)
    }
}

/// Keep the first occurrence of each row, comparing the selected columns (all by default).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropDuplicates {
    subset: Option<Vec<String>>,
}

impl DropDuplicates {
    pub fn all_columns() -> Self {
        Self::default()
    }

    /// Rows count as duplicates when these columns match. Every name must exist in the table.
    pub fn subset<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subset: Some(columns.into_iter().map(Into::into).collect()),
        }
    }
}

impl Transform for DropDuplicates {
    fn apply(&self, table: &Table) -> StepResult<Table> {
        let indexes = resolve_columns(table, self.subset.as_deref())?;
        let mut seen = HashSet::with_capacity(table.row_count());
        let rows = table
            .rows
            .iter()
            .filter(|row| seen.insert(indexes.iter().map(|&i| row[i].key()).collect::<Vec<_>>()))
            .cloned()
            .collect();
        Ok(Table::new(table.schema.clone(), rows))
    }
}

fn resolve_columns(table: &Table, names: Option<&[String]>) -> StepResult<Vec<usize>> {
    match names {
        None => Ok((0..table.column_count()).collect()),
        Some(names) => names
            .iter()
            .map(|n| table.schema.index_of(n).ok_or_else(|| StepError::MissingColumn(n.clone())))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field};

    fn table() -> Table {
        Table::from_columns(vec![
            (
                Field::new("id", DataType::Int64),
                vec![Value::Int64(1), Value::Int64(1), Value::Null, Value::Int64(3)],
            ),
            (
                Field::new("city", DataType::Utf8),
                vec![
                    Value::Utf8("oslo".into()),
                    Value::Utf8("oslo".into()),
                    Value::Utf8("rome".into()),
                    Value::Null,
                ],
            ),
        ])
    }

    #[test]
    fn drop_missing_any_and_selected() {
        let t = table();
        assert_eq!(DropMissing::any_column().apply(&t).unwrap().row_count(), 2);
        assert_eq!(DropMissing::columns(["id"]).apply(&t).unwrap().row_count(), 3);

        let err = DropMissing::columns(["nope"]).apply(&t).unwrap_err();
        assert_eq!(err.to_string(), "column 'nope' not found");
    }

    #[test]
    fn fill_missing_replaces_nulls_and_rederives_kind() {
        let t = table();
        let out = FillMissing::new("city", Value::Utf8("unknown".into())).apply(&t).unwrap();
        assert_eq!(out.rows[3][1], Value::Utf8("unknown".into()));
        assert_eq!(out.schema.fields[1].data_type, DataType::Utf8);

        let out = FillMissing::new("id", Value::Float64(0.5)).apply(&t).unwrap();
        assert_eq!(out.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(out.rows[0][0], Value::Float64(1.0));
        assert_eq!(out.rows[2][0], Value::Float64(0.5));
    }

    #[test]
    fn fill_missing_requires_the_column() {
        let err = FillMissing::new("age", Value::Int64(0)).apply(&table()).unwrap_err();
        assert!(matches!(err, StepError::MissingColumn(ref c) if c == "age"));
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence() {
        let t = table();
        let out = DropDuplicates::all_columns().apply(&t).unwrap();
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.rows[0], t.rows[0]);
        assert_eq!(out.rows[1], t.rows[2]);

        let by_city = DropDuplicates::subset(["city"]).apply(&t).unwrap();
        assert_eq!(by_city.row_count(), 3);
    }

    #[test]
    fn drop_duplicates_treats_nulls_as_equal() {
        let t = Table::from_columns(vec![(Field::new("x", DataType::Int64), vec![Value::Null, Value::Null])]);
        assert_eq!(DropDuplicates::all_columns().apply(&t).unwrap().row_count(), 1);
    }
}
