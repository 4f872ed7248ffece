//! Size-bounded rotating writer.
//!
//! [`RotatingWriter`] appends byte chunks to a live file and keeps its own
//! count of the bytes written. When a chunk would push a non-empty live
//! file past the size budget, or the budget has already been reached, the
//! write first shifts the backups (see [`crate::backup`]) and then appends
//! to a fresh live file.
//!
//! # Invariants
//!
//! - Rotation happens strictly before the chunk that triggered it, so the
//!   triggering chunk always lands in an empty live file.
//! - The live file only outgrows the budget when a single chunk is larger
//!   than the budget; such a chunk is written whole, never split.
//! - The size counter is the writer's own bookkeeping. It is probed from
//!   disk once at construction and never re-read.
//! - No error escapes [`RotatingWriter::write`]; failures go to the
//!   injected [`DiagnosticSink`] and the chunk is dropped.
//! - Every call opens, appends and closes the file before returning, so
//!   file content follows call order.

use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backup::{BackupRenamer, ShiftReport};
use crate::diag::{DiagnosticSink, ReportExt, TraceEvent};
use crate::error::{ConfigError, FsOp, IoFailure};
use crate::policy::{FileOptions, RotationPolicy};
use crate::touch;

/// Outcome of a single write, for callers that want to observe it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Backups were shifted before this chunk was appended.
    pub rotated: bool,
    /// The chunk reached the file.
    pub persisted: bool,
}

/// Appends chunks to a live file, rotating it once it reaches its budget.
pub struct RotatingWriter {
    file_path: PathBuf,
    max_size_bytes: u64,
    current_size_bytes: u64,
    file: FileOptions,
    renamer: BackupRenamer,
    diag: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("file_path", &self.file_path)
            .field("max_size_bytes", &self.max_size_bytes)
            .field("current_size_bytes", &self.current_size_bytes)
            .field("max_backups", &self.renamer.max_backups())
            .finish_non_exhaustive()
    }
}

impl RotatingWriter {
    /// Create a writer for `file_path`.
    ///
    /// The arguments are validated before the filesystem is touched. Then
    /// the live file's current size is adopted, or the file is created
    /// empty if missing. Existing content is never discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFilePath`] for an empty path and
    /// [`ConfigError::InvalidMaxSize`] when the policy has no positive size
    /// budget. Filesystem problems are reported to `diag`, not returned.
    pub fn new(
        file_path: impl Into<PathBuf>,
        policy: &RotationPolicy,
        diag: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        let file_path = file_path.into();
        if file_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFilePath);
        }
        let max_size_bytes = policy.require_size_limit()?;

        let mut writer = Self {
            renamer: BackupRenamer::new(&file_path, policy.backups()),
            file_path,
            max_size_bytes,
            current_size_bytes: 0,
            file: policy.file,
            diag,
        };
        writer.current_size_bytes = writer.initial_size();
        Ok(writer)
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[must_use]
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    #[must_use]
    pub fn max_backups(&self) -> u32 {
        self.renamer.max_backups()
    }

    /// Bytes the writer believes the live file holds.
    #[must_use]
    pub const fn current_size_bytes(&self) -> u64 {
        self.current_size_bytes
    }

    /// Path of backup slot `index` (1 = most recent).
    #[must_use]
    pub fn backup_path(&self, index: u32) -> PathBuf {
        self.renamer.backup_path(index)
    }

    /// The live file has reached its budget.
    #[must_use]
    pub const fn should_rotate(&self) -> bool {
        self.current_size_bytes >= self.max_size_bytes
    }

    /// Appending `len` more bytes calls for a rotation first: the budget is
    /// already reached, or the chunk would overflow a non-empty live file.
    #[must_use]
    pub const fn needs_rotation(&self, len: u64) -> bool {
        self.current_size_bytes > 0
            && (self.should_rotate()
                || self.current_size_bytes.saturating_add(len) > self.max_size_bytes)
    }

    /// Shift the backups and start counting from zero.
    pub fn rotate(&mut self) -> ShiftReport {
        self.diag.trace(TraceEvent::Rotating {
            path: &self.file_path,
            size: self.current_size_bytes,
            limit: self.max_size_bytes,
        });
        let report = self.renamer.shift(self.diag.as_ref());
        self.current_size_bytes = 0;
        report
    }

    /// Append `chunk` to the live file, rotating first when
    /// [`needs_rotation`](Self::needs_rotation) says so.
    ///
    /// Never fails: an append error is reported and the chunk is dropped.
    /// The size counter only grows by chunks that were written.
    pub fn write(&mut self, chunk: &[u8]) -> WriteReport {
        let mut report = WriteReport::default();
        if self.needs_rotation(chunk.len() as u64) {
            self.rotate();
            report.rotated = true;
        }

        if self.append(chunk).or_report(self.diag.as_ref()).is_some() {
            self.current_size_bytes += chunk.len() as u64;
            report.persisted = true;
        }
        report
    }

    fn append(&self, chunk: &[u8]) -> Result<(), IoFailure> {
        append_chunk(&self.file_path, &self.file, chunk)
    }

    /// Size of the live file at construction time. An existing file is
    /// adopted as is, whatever the open flags say.
    fn initial_size(&self) -> u64 {
        let diag = self.diag.as_ref();
        match fs::metadata(&self.file_path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                touch::ensure(&self.file_path, &self.file, diag);
                0
            }
            Err(err) => {
                diag.report(&IoFailure::new(FsOp::Stat, &self.file_path, err));
                0
            }
        }
    }
}

/// Open `path` for append, write the whole chunk, close it.
pub(crate) fn append_chunk(path: &Path, options: &FileOptions, chunk: &[u8]) -> Result<(), IoFailure> {
    let mut file = options
        .append_options()
        .open(path)
        .map_err(IoFailure::at(FsOp::Append, path))?;
    file.write_all(chunk)
        .and_then(|()| file.flush())
        .map_err(IoFailure::at(FsOp::Append, path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
