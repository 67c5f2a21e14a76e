use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_data_cleaning::loader::{
    load, load_glob, CompositeObserver, LoadContext, LoadObserver, LoadOptions, LoadSeverity, LoadStats,
    TableFormat, TracingObserver,
};
use rust_data_cleaning::LoadError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("rust-data-cleaning-{name}-{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        format: Some(TableFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Critical,
        ..Default::default()
    };

    let _ = load("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let dir = tmp_dir("dup");
    let path = dir.join("dup.csv");
    std::fs::write(&path, "A,a\n1,2\n").unwrap();
    let _ = load(&path, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_errors_too() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Error,
        ..Default::default()
    };

    let dir = tmp_dir("dup-alert");
    let path = dir.join("dup.csv");
    std::fs::write(&path, "Score,score\n1,2\n").unwrap();
    let _ = load(&path, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Error]);
}

#[test]
fn unsupported_extension_is_not_reported() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: LoadSeverity::Error,
        ..Default::default()
    };

    let err = load("tests/fixtures/people.unknown", &opts).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out_success() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![a.clone(), b.clone(), Arc::new(TracingObserver)]);
    let opts = LoadOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let _ = load("tests/fixtures/people.csv", &opts).unwrap();

    let expected = vec![LoadStats { rows: 4, columns: 5 }];
    assert_eq!(*a.successes.lock().unwrap(), expected);
    assert_eq!(*b.successes.lock().unwrap(), expected);
}

#[test]
fn load_glob_loads_matches_in_sorted_order() {
    let dir = tmp_dir("glob");
    std::fs::write(dir.join("b.csv"), "x\n1\n2\n").unwrap();
    std::fs::write(dir.join("a.csv"), "X\n3\n").unwrap();
    std::fs::write(dir.join("ignored.json"), "{}").unwrap();

    let pattern = format!("{}/*.csv", dir.display());
    let loaded = load_glob(&pattern, &LoadOptions::default()).unwrap();

    let names: Vec<_> = loaded
        .iter()
        .map(|(p, t)| (p.file_name().unwrap().to_string_lossy().into_owned(), t.row_count()))
        .collect();
    assert_eq!(names, vec![("a.csv".to_string(), 1), ("b.csv".to_string(), 2)]);

    let none = load_glob(&format!("{}/*.parquet", dir.display()), &LoadOptions::default()).unwrap();
    assert!(none.is_empty());
}

#[test]
fn severities_order_error_below_critical() {
    assert!(LoadSeverity::Error < LoadSeverity::Critical);
}

#[test]
fn load_glob_rejects_bad_patterns() {
    let err = load_glob("[", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Pattern(_)));
}
