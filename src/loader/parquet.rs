//! Parquet reader.

use std::collections::HashMap;
use std::path::Path;

use chrono::DateTime;
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::LoadResult;
use crate::types::{Table, Value};

use super::columns::assemble_inferred;

/// Read a Parquet file into an in-memory [`Table`].
///
/// Notes:
/// - Columns are the top-level fields of the file schema, in schema order
/// - Uses the Parquet record API (`RowIter`); column kinds are inferred from the decoded values
/// - `DATE` and `TIMESTAMP` values become [`Value::Timestamp`]; nested groups, lists, maps and
///   decimals are rendered as text
pub fn read_parquet_from_path(path: impl AsRef<Path>) -> LoadResult<Table> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let names: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for row_res in reader.into_iter() {
        let row = row_res?;

        let mut by_name: HashMap<&str, &Field> = HashMap::new();
        for (name, field) in row.get_column_iter() {
            by_name.insert(name.as_str(), field);
        }

        let out_row = names
            .iter()
            .map(|name| by_name.get(name.as_str()).map_or(Value::Null, |f| convert_parquet_field(f)))
            .collect();
        rows.push(out_row);
    }

    Ok(assemble_inferred(names, rows))
}

fn convert_parquet_field(f: &Field) -> Value {
    match f {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(v) => Value::Int64(i64::from(*v)),
        Field::Short(v) => Value::Int64(i64::from(*v)),
        Field::Int(v) => Value::Int64(i64::from(*v)),
        Field::Long(v) => Value::Int64(*v),
        Field::UByte(v) => Value::Int64(i64::from(*v)),
        Field::UShort(v) => Value::Int64(i64::from(*v)),
        Field::UInt(v) => Value::Int64(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).map_or(Value::Float64(*v as f64), Value::Int64),
        Field::Float(v) => Value::Float64(f64::from(*v)),
        Field::Double(v) => Value::Float64(*v),
        Field::Str(s) => Value::Utf8(s.clone()),
        Field::Date(days) => DateTime::from_timestamp(i64::from(*days) * 86_400, 0)
            .map_or(Value::Null, |dt| Value::Timestamp(dt.naive_utc())),
        Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms)
            .map_or(Value::Null, |dt| Value::Timestamp(dt.naive_utc())),
        Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us)
            .map_or(Value::Null, |dt| Value::Timestamp(dt.naive_utc())),
        other => Value::Utf8(other.to_string()),
    }
}
