//! Observer hooks for ingestion, reconciliation and export outcomes.
//!
//! The reconciler itself is pure; callers that want logs or alerts (the unified ingestion entry
//! point, [`crate::job::ReconJob::run`], the CLI) report to an [`Observer`].
//!
//! - [`TracingObserver`] emits structured `tracing` events.
//! - [`FileObserver`] appends one line per event to a local file.
//! - [`CompositeObserver`] fans out to several observers.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{IngestionError, ReconError};
use crate::ingestion::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path used for ingestion.
    pub path: PathBuf,
    /// Format used for ingestion.
    pub format: IngestionFormat,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestionStats {
    pub rows: usize,
    pub columns: usize,
}

/// Which reconciliation was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconOperation {
    Exact,
    Outer,
    Membership,
}

impl fmt::Display for ReconOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReconOperation::Exact => "exact",
            ReconOperation::Outer => "outer",
            ReconOperation::Membership => "membership",
        })
    }
}

/// Context about a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconContext {
    pub operation: ReconOperation,
    pub left_rows: usize,
    pub right_rows: usize,
}

/// Outcome counts of a reconciliation. Fields that do not apply to an operation are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconStats {
    /// Rows reported as differing (exact: all result rows; outer: non-`both` rows).
    pub differing: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub both: usize,
    /// Distinct common keys (membership only).
    pub common_keys: usize,
    /// Rows highlighted on export (membership only).
    pub highlighted: usize,
}

/// Observer interface for pipeline outcomes.
///
/// Every method has an empty default, so implementors only override what they record.
pub trait Observer: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_ingested(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_ingest_failure(&self, _ctx: &IngestionContext, _severity: Severity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_ingest_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        self.on_ingest_failure(ctx, severity, error)
    }

    /// Called when a reconciliation completes.
    fn on_reconciled(&self, _ctx: &ReconContext, _stats: ReconStats) {}

    /// Called when a reconciliation is rejected (schema mismatch, missing column).
    fn on_recon_failure(&self, _ctx: &ReconContext, _error: &ReconError) {}

    /// Called after an output file has been written.
    fn on_exported(&self, _path: &Path, _rows: usize) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn Observer>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        Self { observers }
    }

    /// Add another observer.
    pub fn push(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl Observer for CompositeObserver {
    fn on_ingested(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_ingested(ctx, stats);
        }
    }

    fn on_ingest_failure(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        for o in &self.observers {
            o.on_ingest_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_reconciled(&self, ctx: &ReconContext, stats: ReconStats) {
        for o in &self.observers {
            o.on_reconciled(ctx, stats);
        }
    }

    fn on_recon_failure(&self, ctx: &ReconContext, error: &ReconError) {
        for o in &self.observers {
            o.on_recon_failure(ctx, error);
        }
    }

    fn on_exported(&self, path: &Path, rows: usize) {
        for o in &self.observers {
            o.on_exported(path, rows);
        }
    }
}

/// Emits events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_ingested(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            format = ?ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            columns = stats.columns,
            "ingested"
        );
    }

    fn on_ingest_failure(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        tracing::error!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            error = %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        tracing::error!(
            alert = true,
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            error = %error,
            "ingestion alert"
        );
    }

    fn on_reconciled(&self, ctx: &ReconContext, stats: ReconStats) {
        tracing::info!(
            operation = %ctx.operation,
            left_rows = ctx.left_rows,
            right_rows = ctx.right_rows,
            differing = stats.differing,
            left_only = stats.left_only,
            right_only = stats.right_only,
            both = stats.both,
            common_keys = stats.common_keys,
            "reconciled"
        );
    }

    fn on_recon_failure(&self, ctx: &ReconContext, error: &ReconError) {
        tracing::error!(operation = %ctx.operation, error = %error, "reconciliation failed");
    }

    fn on_exported(&self, path: &Path, rows: usize) {
        tracing::info!(path = %path.display(), rows, "exported");
    }
}

/// Appends events to a local log file.
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
            let _ = writeln!(f, "{} {line}", unix_ts());
        }
    }
}

impl Observer for FileObserver {
    fn on_ingested(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "ingest ok format={:?} path={} rows={} columns={}",
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.columns
        ));
    }

    fn on_ingest_failure(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        self.append_line(&format!(
            "ingest fail severity={:?} format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: Severity, error: &IngestionError) {
        self.append_line(&format!(
            "ALERT severity={:?} format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_reconciled(&self, ctx: &ReconContext, stats: ReconStats) {
        self.append_line(&format!(
            "recon ok op={} left_rows={} right_rows={} differing={} left_only={} right_only={} both={} common_keys={}",
            ctx.operation,
            ctx.left_rows,
            ctx.right_rows,
            stats.differing,
            stats.left_only,
            stats.right_only,
            stats.both,
            stats.common_keys
        ));
    }

    fn on_recon_failure(&self, ctx: &ReconContext, error: &ReconError) {
        self.append_line(&format!("recon fail op={} err={}", ctx.operation, error));
    }

    fn on_exported(&self, path: &Path, rows: usize) {
        self.append_line(&format!("export ok path={} rows={rows}", path.display()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
