//! Idempotent file creation.

use std::io;
use std::path::Path;

use crate::diag::{DiagnosticSink, ReportExt, TraceEvent};
use crate::error::{FsOp, IoFailure};
use crate::policy::FileOptions;

/// What [`ensure`] found at the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    /// Something was already there and was left alone.
    Existing,
    /// An empty file was created.
    Created,
}

/// Make sure `path` exists, creating an empty file with the configured mode
/// if it does not. Existing files are never modified.
///
/// Failures go to `diag` and yield `None`.
pub fn ensure(path: &Path, options: &FileOptions, diag: &dyn DiagnosticSink) -> Option<Touch> {
    let touch = try_ensure(path, options).or_report(diag)?;
    if touch == Touch::Created {
        diag.trace(TraceEvent::Touched { path });
    }
    Some(touch)
}

/// Exclusive-create `path`; an `AlreadyExists` error means someone got
/// there first, which is the same outcome as finding the file.
pub(crate) fn try_ensure(path: &Path, options: &FileOptions) -> Result<Touch, IoFailure> {
    match options.create_options().create_new(true).open(path) {
        Ok(_file) => Ok(Touch::Created),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(Touch::Existing),
        Err(err) => Err(IoFailure::new(FsOp::Create, path, err)),
    }
}
