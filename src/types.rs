//! Core data model types.
//!
//! Every component in this crate works on an in-memory [`Table`]: a [`Schema`] (ordered, typed
//! [`Field`]s) plus row-major storage of [`Value`]s. Tables are plain owned values; operations
//! that transform a table return a new one.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Declared value kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Date and time without a zone.
    Timestamp,
    /// Heterogeneous or unknown (e.g. a column with no non-null values).
    Mixed,
}

impl DataType {
    /// `Int64` or `Float64`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    pub fn is_text(self) -> bool {
        self == Self::Utf8
    }

    pub fn is_temporal(self) -> bool {
        self == Self::Timestamp
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
            Self::Timestamp => "timestamp",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Declared kind of the column.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single cell in a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Utf8(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The kind of this cell, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
            Self::Timestamp(_) => Some(DataType::Timestamp),
        }
    }

    /// Numeric view of the cell (`Int64` widens to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counting and duplicate detection.
    pub(crate) fn key(&self) -> ValueKey<'_> {
        match self {
            Self::Null => ValueKey::Null,
            Self::Int64(v) => ValueKey::Int64(*v),
            Self::Float64(v) => {
                // -0.0 == 0.0 and every NaN is the same value.
                let bits = if *v == 0.0 {
                    0.0_f64.to_bits()
                } else if v.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    v.to_bits()
                };
                ValueKey::Float64(bits)
            }
            Self::Bool(b) => ValueKey::Bool(*b),
            Self::Utf8(s) => ValueKey::Utf8(s.as_str()),
            Self::Timestamp(ts) => ValueKey::Timestamp(*ts),
        }
    }
}

/// Renders the cell as text. `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Utf8(s) => f.write_str(s),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey<'a> {
    Null,
    Int64(i64),
    Float64(u64),
    Bool(bool),
    Utf8(&'a str),
    Timestamp(NaiveDateTime),
}

/// Parse a timestamp from the textual forms the loaders and date rules accept.
///
/// Accepts RFC 3339 (offset dropped after converting to UTC), `YYYY-MM-DD HH:MM[:SS[.fff]]`,
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, and bare dates `YYYY-MM-DD` / `YYYY/MM/DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Infer a column kind from its cells.
///
/// Nulls are ignored. Integer and float cells together widen to `Float64`; any other mix (or no
/// non-null cell at all) yields `Mixed`.
pub fn infer_data_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> DataType {
    let mut seen: Option<DataType> = None;
    for v in values {
        let Some(dt) = v.data_type() else { continue };
        seen = match seen {
            None => Some(dt),
            Some(prev) if prev == dt => Some(prev),
            Some(prev) if prev.is_numeric() && dt.is_numeric() => Some(DataType::Float64),
            Some(_) => return DataType::Mixed,
        };
    }
    seen.unwrap_or(DataType::Mixed)
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields; every row
/// holds exactly one cell per field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a table from named, typed columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns do not all have the same length.
    pub fn from_columns(columns: Vec<(Field, Vec<Value>)>) -> Self {
        let row_count = columns.first().map_or(0, |(_, values)| values.len());
        for (field, values) in &columns {
            assert!(
                values.len() == row_count,
                "column '{}' has {} values, expected {}",
                field.name,
                values.len(),
                row_count
            );
        }

        let mut rows: Vec<Vec<Value>> = (0..row_count).map(|_| Vec::with_capacity(columns.len())).collect();
        let mut fields = Vec::with_capacity(columns.len());
        for (field, values) in columns {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            fields.push(field);
        }
        Self::new(Schema::new(fields), rows)
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Option<Column<'_>> {
        let index = self.schema.index_of(name)?;
        Some(Column {
            field: &self.schema.fields[index],
            index,
            rows: &self.rows,
        })
    }

    /// Iterate all columns in schema order.
    pub fn columns(&self) -> impl Iterator<Item = Column<'_>> {
        self.schema.fields.iter().enumerate().map(|(index, field)| Column {
            field,
            index,
            rows: &self.rows,
        })
    }

    /// Names of the columns whose declared kind satisfies `predicate`.
    pub fn column_names_where<P>(&self, mut predicate: P) -> Vec<String>
    where
        P: FnMut(DataType) -> bool,
    {
        self.schema
            .fields
            .iter()
            .filter(|f| predicate(f.data_type))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Create a new table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Re-derive the declared kind of column `index` from its cells with [`infer_data_type`].
    ///
    /// Integer cells are widened when the column comes out `Float64`, so the column stays
    /// homogeneous.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for the schema.
    pub fn reinfer_column(&mut self, index: usize) -> DataType {
        let data_type = infer_data_type(self.rows.iter().map(|row| &row[index]));
        if data_type == DataType::Float64 {
            for row in &mut self.rows {
                if let Value::Int64(v) = row[index] {
                    row[index] = Value::Float64(v as f64);
                }
            }
        }
        self.schema.fields[index].data_type = data_type;
        data_type
    }

    /// Rewrite every cell of column `index` in place and set its declared kind.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for the schema.
    pub fn update_column<F>(&mut self, index: usize, data_type: DataType, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        self.schema.fields[index].data_type = data_type;
        for row in &mut self.rows {
            let next = f(&row[index]);
            row[index] = next;
        }
    }
}

/// Borrowed view of one column of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    field: &'a Field,
    index: usize,
    rows: &'a [Vec<Value>],
}

impl<'a> Column<'a> {
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn data_type(&self) -> DataType {
        self.field.data_type
    }

    /// Position of the column in the schema.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn values(self) -> impl Iterator<Item = &'a Value> {
        let index = self.index;
        self.rows.iter().map(move |row| &row[index])
    }

    /// Non-null cells only.
    pub fn non_null(self) -> impl Iterator<Item = &'a Value> {
        self.values().filter(|v| !v.is_null())
    }

    pub fn null_count(&self) -> usize {
        self.values().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> usize {
        self.non_null().map(Value::key).collect::<HashSet<_>>().len()
    }
}
