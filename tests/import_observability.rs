mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use common::{fixture_files, RecordingSink, FIXTURE_DIR};
use volunteer_sheets_import::import::{run_import, ImportOptions};
use volunteer_sheets_import::ingestion::{
    CompositeObserver, FileObserver, ImportContext, ImportObserver, ImportSeverity, ImportStats,
};
use volunteer_sheets_import::ImportError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, ImportStats)>>,
    failures: Mutex<Vec<(String, ImportSeverity)>>,
    alerts: Mutex<Vec<(String, ImportSeverity)>>,
}

impl ImportObserver for RecordingObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        self.successes.lock().unwrap().push((ctx.sheet.clone(), stats));
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, _error: &ImportError) {
        self.failures.lock().unwrap().push((ctx.sheet.clone(), severity));
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, _error: &ImportError) {
        self.alerts.lock().unwrap().push((ctx.sheet.clone(), severity));
    }
}

fn options_with(obs: Arc<RecordingObserver>) -> ImportOptions {
    ImportOptions {
        observer: Some(obs as Arc<dyn ImportObserver>),
        alert_at_or_above: ImportSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_stats_for_each_published_file() {
    let obs = Arc::new(RecordingObserver::default());
    let mut sink = RecordingSink::default();
    run_import(&fixture_files(), &mut sink, &options_with(obs.clone()));

    let successes = obs.successes.lock().unwrap().clone();
    let sheets: Vec<&str> = successes.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(sheets, vec!["people", "shifts", "zz_late"]);
    assert_eq!(
        successes[0].1,
        ImportStats { rows: 3, backfilled_phones: 1, defects: 2 }
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let mut sink = RecordingSink::default();
    let files = vec![PathBuf::from(FIXTURE_DIR).join("does_not_exist.csv")];

    run_import(&files, &mut sink, &options_with(obs.clone()));

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![("does_not_exist".to_string(), ImportSeverity::Critical)]);
    assert_eq!(alerts, vec![("does_not_exist".to_string(), ImportSeverity::Critical)]);
}

#[test]
fn api_rejection_is_reported_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let mut sink = RecordingSink::rejecting("people", 403);

    run_import(&fixture_files(), &mut sink, &options_with(obs.clone()));

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![("people".to_string(), ImportSeverity::Error)]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert_eq!(obs.successes.lock().unwrap().len(), 2);
}

#[test]
fn server_errors_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let mut sink = RecordingSink::rejecting("shifts", 503);

    run_import(&fixture_files(), &mut sink, &options_with(obs.clone()));

    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(alerts, vec![("shifts".to_string(), ImportSeverity::Critical)]);
}

#[test]
fn composite_fans_out_to_file_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("outcomes.log");
    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn ImportObserver>> =
        vec![recorder.clone(), Arc::new(FileObserver::new(&log))];
    let composite = CompositeObserver::new(observers);
    let options = ImportOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let mut sink = RecordingSink::rejecting("zz_late", 400);
    run_import(&fixture_files(), &mut sink, &options);

    assert_eq!(recorder.successes.lock().unwrap().len(), 2);
    let text = std::fs::read_to_string(&log).unwrap();
    assert_eq!(text.lines().filter(|l| l.contains(" ok ")).count(), 2);
    assert_eq!(text.lines().filter(|l| l.contains(" fail ")).count(), 1);
    assert!(text.contains("sheet=zz_late"));
}
