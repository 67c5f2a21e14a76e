//! Text normalization for string columns.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::StepResult;
use crate::pipeline::Transform;
use crate::types::{DataType, Table, Value};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

/// Normalize one string.
///
/// In order: trim, lowercase, collapse whitespace runs to one space, strip every character that
/// is not alphanumeric, underscore or whitespace. Stripping can leave doubled or edge spaces
/// (`"a - b"` → `"a  b"`), so a final collapse and trim follow; the result is a fixed point.
pub fn normalize_str(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = WHITESPACE_RUN.replace_all(&lowered, " ");
    let stripped = DISALLOWED.replace_all(&collapsed, "");
    WHITESPACE_RUN.replace_all(stripped.trim(), " ").into_owned()
}

/// Normalize the text of selected columns and return a new table.
///
/// - `columns == None` selects every `Utf8` column
/// - named columns missing from the table are skipped
/// - non-text cells are stringified first; selected columns end up `Utf8`
/// - null cells stay null
///
/// Applying this twice gives the same table as applying it once.
pub fn normalize_text(table: &Table, columns: Option<&[&str]>) -> Table {
    let mut targets: Vec<usize> = match columns {
        Some(names) => names.iter().filter_map(|n| table.schema.index_of(n)).collect(),
        None => table
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.data_type.is_text())
            .map(|(idx, _)| idx)
            .collect(),
    };
    targets.sort_unstable();
    targets.dedup();

    let mut out = table.clone();
    for &idx in &targets {
        out.update_column(idx, DataType::Utf8, |v| match v {
            Value::Null => Value::Null,
            Value::Utf8(s) => Value::Utf8(normalize_str(s)),
            other => Value::Utf8(normalize_str(&other.to_string())),
        });
    }

    debug!(
        columns = ?targets.iter().map(|&i| table.schema.fields[i].name.as_str()).collect::<Vec<_>>(),
        rows = table.row_count(),
        "normalized text"
    );
    out
}

/// [`normalize_text`] as a pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextNormalizer {
    columns: Option<Vec<String>>,
}

impl TextNormalizer {
    /// Normalize every `Utf8` column.
    pub fn all_text() -> Self {
        Self::default()
    }

    /// Normalize only the named columns.
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

impl Transform for TextNormalizer {
    fn apply(&self, table: &Table) -> StepResult<Table> {
        let names: Option<Vec<&str>> = self
            .columns
            .as_ref()
            .map(|cols| cols.iter().map(String::as_str).collect());
        Ok(normalize_text(table, names.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    fn table() -> Table {
        Table::from_columns(vec![
            (
                Field::new("name", DataType::Utf8),
                vec![
                    Value::Utf8("  Hello,   WORLD!! ".into()),
                    Value::Null,
                    Value::Utf8("a - b".into()),
                ],
            ),
            (
                Field::new("code", DataType::Int64),
                vec![Value::Int64(7), Value::Int64(-3), Value::Null],
            ),
            (
                Field::new("note", DataType::Utf8),
                vec![
                    Value::Utf8("Keep_Me".into()),
                    Value::Utf8("Tab\there".into()),
                    Value::Utf8("???".into()),
                ],
            ),
        ])
    }

    #[test]
    fn normalize_str_applies_steps_in_order() {
        assert_eq!(normalize_str("  Hello,   WORLD!! "), "hello world");
        assert_eq!(normalize_str("a - b"), "a b");
        assert_eq!(normalize_str("snake_case Stays"), "snake_case stays");
        assert_eq!(normalize_str("Ünïcödé Café"), "ünïcödé café");
        assert_eq!(normalize_str("?!"), "");
    }

    #[test]
    fn defaults_to_text_columns_and_keeps_nulls() {
        let out = normalize_text(&table(), None);
        assert_eq!(out.rows[0][0], Value::Utf8("hello world".into()));
        assert_eq!(out.rows[1][0], Value::Null);
        assert_eq!(out.rows[1][2], Value::Utf8("tab here".into()));
        assert_eq!(out.rows[2][2], Value::Utf8(String::new()));
        // Non-text column untouched.
        assert_eq!(out.rows[0][1], Value::Int64(7));
        assert_eq!(out.schema.fields[1].data_type, DataType::Int64);
    }

    #[test]
    fn explicit_columns_stringify_and_skip_absent_names() {
        let input = table();
        let out = normalize_text(&input, Some(&["code", "missing"][..]));
        assert_eq!(out.schema.fields[1].data_type, DataType::Utf8);
        assert_eq!(out.rows[1][1], Value::Utf8("3".into()));
        assert_eq!(out.rows[2][1], Value::Null);
        // Unselected text column untouched, input untouched.
        assert_eq!(out.rows[0][0], input.rows[0][0]);
        assert_eq!(input.schema.fields[1].data_type, DataType::Int64);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_text(&table(), Some(&["name", "code", "note"][..]));
        let twice = normalize_text(&once, Some(&["name", "code", "note"][..]));
        assert_eq!(once, twice);

        for raw in ["  x  .  y ", "--a--b--", "MiXeD\n\nLines\t!", " . "] {
            let n = normalize_str(raw);
            assert_eq!(normalize_str(&n), n, "not a fixed point for {raw:?}");
        }
    }

    #[test]
    fn normalizer_runs_as_pipeline_step() {
        let step = TextNormalizer::columns(["note"]);
        let out = step.apply(&table()).unwrap();
        assert_eq!(out.rows[0][2], Value::Utf8("keep_me".into()));
        assert_eq!(out.rows[0][0], Value::Utf8("  Hello,   WORLD!! ".into()));
    }
}
