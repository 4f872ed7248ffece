//! Diagnostic sinks.
//!
//! Every filesystem step in the writer returns a `Result`. Failures are
//! funnelled through [`ReportExt::or_report`], which hands them to the
//! [`DiagnosticSink`] injected at construction and lets the write path
//! carry on. Nothing in here ever reaches the caller of `write`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ErrorCode, FsOp, IoFailure};

/// Noteworthy steps taken by the writer, reported for debugging.
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// The live file did not exist and was created.
    Touched { path: &'a Path },
    /// The live file is full or the next chunk would overflow it; backups
    /// are about to shift.
    Rotating {
        path: &'a Path,
        size: u64,
        limit: u64,
    },
    /// A file moved one backup slot up.
    Renamed { from: &'a Path, to: &'a Path },
    /// A backup fell outside the retained window and was deleted.
    Evicted { path: &'a Path },
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Touched { path } => write!(f, "touched {}", path.display()),
            Self::Rotating { path, size, limit } => {
                write!(f, "rotating {} at {size}/{limit} bytes", path.display())
            }
            Self::Renamed { from, to } => {
                write!(f, "renamed {} -> {}", from.display(), to.display())
            }
            Self::Evicted { path } => write!(f, "evicted {}", path.display()),
        }
    }
}

/// Receiver for writer failures and trace events.
///
/// Implementations must not panic; the writer calls them from inside its
/// error-recovery path.
pub trait DiagnosticSink: Send + Sync {
    /// A filesystem step failed and was skipped.
    fn report(&self, failure: &IoFailure);

    /// A step completed. Ignored unless the sink cares.
    fn trace(&self, _event: TraceEvent<'_>) {}
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Default sink: failures become `tracing` warnings, trace events become
/// debug events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, failure: &IoFailure) {
        tracing::warn!(
            code = failure.code().code(),
            op = failure.op.as_str(),
            path = %failure.path.display(),
            error = %failure.source,
            "{}",
            failure.code().message()
        );
    }

    fn trace(&self, event: TraceEvent<'_>) {
        tracing::debug!(target: "rollfile::writer", "{event}");
    }
}

/// Writes one line per failure to the process's standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrDiagnostics;

impl DiagnosticSink for StderrDiagnostics {
    fn report(&self, failure: &IoFailure) {
        eprintln!("{failure}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl DiagnosticSink for NullDiagnostics {
    fn report(&self, _failure: &IoFailure) {}
}

/// Owned copy of a reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    pub op: FsOp,
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl RecordedFailure {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.op.code()
    }
}

#[derive(Debug, Default)]
struct Recorded {
    failures: Vec<RecordedFailure>,
    traces: Vec<String>,
}

/// Keeps everything it receives in memory. Cloning yields a new handle to
/// the same log, so a test can hand one clone to the writer and inspect
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.lock().failures.clone()
    }

    /// Rendered trace events so far, oldest first.
    #[must_use]
    pub fn traces(&self) -> Vec<String> {
        self.lock().traces.clone()
    }

    /// Failures reported for one kind of operation.
    #[must_use]
    pub fn failures_for(&self, op: FsOp) -> Vec<RecordedFailure> {
        self.lock()
            .failures
            .iter()
            .filter(|failure| failure.op == op)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        // A panicking test thread must not hide what was recorded.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&self, failure: &IoFailure) {
        self.lock().failures.push(RecordedFailure {
            op: failure.op,
            path: failure.path.clone(),
            kind: failure.source.kind(),
            message: failure.source.to_string(),
        });
    }

    fn trace(&self, event: TraceEvent<'_>) {
        self.lock().traces.push(event.to_string());
    }
}

// ---------------------------------------------------------------------------
// Logged-and-continue policy
// ---------------------------------------------------------------------------

/// Converts a failed step into a diagnostic and an empty value.
pub(crate) trait ReportExt<T> {
    fn or_report(self, diag: &dyn DiagnosticSink) -> Option<T>;
}

impl<T> ReportExt<T> for Result<T, IoFailure> {
    fn or_report(self, diag: &dyn DiagnosticSink) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(failure) => {
                diag.report(&failure);
                None
            }
        }
    }
}
