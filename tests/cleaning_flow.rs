use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rust_data_cleaning::error::StepError;
use rust_data_cleaning::loader::{load, LoadOptions};
use rust_data_cleaning::pipeline::{Pipeline, PipelineEvent, PipelineObserver, StepStatus};
use rust_data_cleaning::quality::{diff, snapshot, QualitySnapshot};
use rust_data_cleaning::steps::{DropDuplicates, DropMissing, FillMissing};
use rust_data_cleaning::text::TextNormalizer;
use rust_data_cleaning::types::{DataType, Table, Value};
use rust_data_cleaning::validation::{validate, RuleSet};

fn people() -> Table {
    load("tests/fixtures/people.csv", &LoadOptions::default()).unwrap()
}

fn cleaning_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step("fill score", FillMissing::new("score", Value::Float64(0.0)))
        .with_step("drop unnamed", DropMissing::columns(["name"]))
        .with_step("normalize names", TextNormalizer::columns(["name"]))
        .with_step("dedupe", DropDuplicates::all_columns())
}

#[test]
fn validate_fixture_against_json_rules() {
    let table = people();
    let raw = std::fs::read_to_string("tests/fixtures/rules.json").unwrap();
    let rules = RuleSet::from_json(&raw).unwrap();
    assert_eq!(rules.len(), 3);

    let result = validate(&table, &rules);

    assert_eq!(
        result.issues("score").unwrap(),
        ["Found 1 missing values", "Found 1 values outside allowed range"]
    );
    assert_eq!(
        result.issues("joined").unwrap(),
        ["Found 1 values that are not valid dates"]
    );
    // Rules for absent columns produce no entry.
    assert!(!result.was_checked("height"));
    assert_eq!(result.issue_count(), 3);
}

#[test]
fn clean_fixture_end_to_end() {
    let raw = people();
    let run = cleaning_pipeline().execute(&raw);

    assert!(run.succeeded());
    assert_eq!(run.outcomes.len(), 4);
    assert!(run.outcomes.iter().all(|o| o.is_success()));

    let cleaned = run.table;
    assert_eq!(cleaned.row_count(), 3);
    let names: Vec<_> = cleaned
        .column("name")
        .unwrap()
        .values()
        .cloned()
        .collect();
    assert_eq!(
        names,
        vec![
            Value::Utf8("ada".to_string()),
            Value::Utf8("grace".to_string()),
            Value::Utf8("linus".to_string()),
        ]
    );
    assert_eq!(cleaned.column("score").unwrap().data_type(), DataType::Float64);
    assert_eq!(cleaned.column("score").unwrap().null_count(), 0);

    // Input is untouched.
    assert_eq!(raw.row_count(), 4);
    assert_eq!(raw.rows[3][1], Value::Utf8("  Linus  ".to_string()));
}

#[test]
fn quality_baseline_survives_a_json_round_trip() {
    let raw = people();
    let baseline = snapshot(&raw);
    let persisted = serde_json::to_string_pretty(&baseline).unwrap();
    let reloaded: QualitySnapshot = serde_json::from_str(&persisted).unwrap();
    assert_eq!(reloaded, baseline);

    let cleaned = cleaning_pipeline().execute(&raw).table;
    let current = snapshot(&cleaned);
    let delta = diff(&current, &reloaded).unwrap();

    assert_eq!(delta.row_count_change, -1);
    let expected: BTreeMap<String, i64> = [
        ("active", 0),
        ("id", 0),
        ("joined", 0),
        ("name", -1),
        ("score", -1),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(delta.missing_values_change, expected);

    let same = diff(&current, &current).unwrap();
    assert!(same.is_unchanged());
}

#[derive(Default)]
struct StepLog(Mutex<Vec<String>>);

impl PipelineObserver for StepLog {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        if let PipelineEvent::StepStarted { name, .. } = event {
            self.0.lock().unwrap().push(name.to_string());
        }
    }
}

#[test]
fn failing_step_stops_the_run_and_surfaces_as_error() {
    let log = Arc::new(StepLog::default());
    let mut pipeline = cleaning_pipeline().with_observer(log.clone());
    pipeline
        .add_step("drop missing height", DropMissing::columns(["height"]))
        .add_step("never runs", |t: &Table| -> Result<Table, StepError> { Ok(t.clone()) });

    let run = pipeline.execute(&people());

    assert!(!run.succeeded());
    assert_eq!(run.outcomes.len(), 5);
    let failed = run.failure().unwrap();
    assert_eq!(failed.index, 4);
    assert_eq!(
        failed.status,
        StepStatus::Failed {
            error: "column 'height' not found".to_string()
        }
    );
    // Table is the output of the last successful step.
    assert_eq!(run.table.row_count(), 3);
    assert!(!log.0.lock().unwrap().iter().any(|n| n == "never runs"));

    let err = run.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "step 4 'drop missing height' failed: column 'height' not found"
    );
}
