use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ErrorClass, UploadError};

use super::unified::TableFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadSeverity {
    /// Informational event.
    Info,
    /// Rejected request (client-caused, non-retryable).
    Warning,
    /// Processing failed.
    Error,
    /// Processing failed because of an I/O-level problem in the decoder.
    Critical,
}

impl UploadSeverity {
    /// Severity for a pipeline failure.
    pub fn for_error(e: &UploadError) -> Self {
        match e.class() {
            ErrorClass::Client => UploadSeverity::Warning,
            ErrorClass::Server if e.involves_io() => UploadSeverity::Critical,
            ErrorClass::Server => UploadSeverity::Error,
        }
    }
}

/// Context about one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContext {
    /// Sanitized file name (possibly empty).
    pub filename: String,
    /// Parser family, once classification succeeded.
    pub format: Option<TableFormat>,
    /// Payload size in bytes.
    pub size: u64,
}

/// Minimal stats reported on a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of parsed data rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called right before the payload is handed to a parser.
    ///
    /// Never called for uploads rejected by validation.
    fn on_parse_started(&self, _ctx: &UploadContext) {}

    /// Called when the upload was parsed successfully.
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when the upload was rejected or failed to parse.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &UploadError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_parse_started(&self, ctx: &UploadContext) {
        for o in &self.observers {
            o.on_parse_started(ctx);
        }
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs upload events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl UploadObserver for StdErrObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        eprintln!(
            "[upload][ok] format={:?} file={} size={} rows={} columns={}",
            ctx.format, ctx.filename, ctx.size, stats.rows, stats.columns
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        eprintln!(
            "[upload][{:?}] format={:?} file={} size={} err={}",
            severity, ctx.format, ctx.filename, ctx.size, error
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        eprintln!(
            "[ALERT][upload][{:?}] format={:?} file={} size={} err={}",
            severity, ctx.format, ctx.filename, ctx.size, error
        );
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        self.append_line(&format!(
            "{} ok format={:?} file={} rows={} columns={}",
            unix_ts(),
            ctx.format,
            ctx.filename,
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.filename,
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.filename,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
