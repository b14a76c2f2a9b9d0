use std::sync::{Arc, Mutex};

use tabular_intake::config::PipelineConfig;
use tabular_intake::ingestion::{
    CompositeObserver, TableFormat, UploadContext, UploadObserver, UploadPipeline, UploadSeverity,
    UploadStats,
};
use tabular_intake::types::UploadRequest;
use tabular_intake::UploadError;

#[derive(Default)]
struct RecordingObserver {
    parse_started: Mutex<Vec<UploadContext>>,
    successes: Mutex<Vec<UploadStats>>,
    failures: Mutex<Vec<UploadSeverity>>,
    alerts: Mutex<Vec<UploadSeverity>>,
}

impl UploadObserver for RecordingObserver {
    fn on_parse_started(&self, ctx: &UploadContext) {
        self.parse_started.lock().unwrap().push(ctx.clone());
    }

    fn on_success(&self, _ctx: &UploadContext, stats: UploadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &UploadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &UploadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn pipeline_with(obs: &Arc<RecordingObserver>, config: PipelineConfig) -> UploadPipeline {
    UploadPipeline::new(config).with_observer(obs.clone())
}

#[test]
fn oversized_upload_never_reaches_the_parser() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = pipeline_with(
        &obs,
        PipelineConfig {
            max_upload_bytes: 8,
            ..Default::default()
        },
    );

    let _ = pipeline
        .ingest(&UploadRequest::new("big.csv", "id\n1\n2\n3\n4\n"))
        .unwrap_err();

    assert!(obs.parse_started.lock().unwrap().is_empty());
    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn unsupported_format_never_reaches_the_parser() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = pipeline_with(&obs, PipelineConfig::default());

    let _ = pipeline
        .ingest(&UploadRequest::new("data.EXE", "id\n1\n"))
        .unwrap_err();

    assert!(obs.parse_started.lock().unwrap().is_empty());
    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Warning]);
}

#[test]
fn successful_upload_reports_parse_start_and_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = pipeline_with(&obs, PipelineConfig::default());

    pipeline
        .ingest(&UploadRequest::new("dir/people.csv", "id,name\n1,Ann\n"))
        .unwrap();

    let started = obs.parse_started.lock().unwrap().clone();
    assert_eq!(
        started,
        vec![UploadContext {
            filename: "people.csv".to_string(),
            format: Some(TableFormat::DelimitedText),
            size: 14,
        }]
    );
    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![UploadStats { rows: 1, columns: 2 }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn parse_failure_alerts_when_threshold_is_error() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline =
        pipeline_with(&obs, PipelineConfig::default()).with_alert_threshold(UploadSeverity::Error);

    let _ = pipeline
        .ingest(&UploadRequest::new("empty.csv", ""))
        .unwrap_err();

    assert_eq!(obs.parse_started.lock().unwrap().len(), 1);
    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![UploadSeverity::Error]);
}

#[test]
fn parse_failure_does_not_alert_at_default_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = pipeline_with(&obs, PipelineConfig::default());

    let _ = pipeline
        .ingest(&UploadRequest::new("bad.csv", b"a\n\xff\n".to_vec()))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn UploadObserver>> = vec![a.clone(), b.clone()];
    let composite = CompositeObserver::new(observers);
    let pipeline = UploadPipeline::default().with_observer(Arc::new(composite));

    pipeline
        .ingest(&UploadRequest::new("x.csv", "v\n1\n2\n"))
        .unwrap();

    for obs in [&a, &b] {
        assert_eq!(obs.parse_started.lock().unwrap().len(), 1);
        assert_eq!(
            *obs.successes.lock().unwrap(),
            vec![UploadStats { rows: 2, columns: 1 }]
        );
    }
}
