//! Record-level facade over the byte writers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diag::{DiagnosticSink, ReportExt};
use crate::error::ConfigError;
use crate::layout::{Layout, TzOffset};
use crate::policy::{FileOptions, RotationPolicy};
use crate::touch;
use crate::writer::{self, RotatingWriter, WriteReport};

/// Platform line terminator appended after every record.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Platform line terminator appended after every record.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Append-only writer without a size budget.
pub struct PlainWriter {
    file_path: PathBuf,
    file: FileOptions,
    diag: Arc<dyn DiagnosticSink>,
}

impl PlainWriter {
    /// Create the file if it is missing. Existing content is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFilePath`] for an empty path.
    pub fn new(
        file_path: impl Into<PathBuf>,
        file: FileOptions,
        diag: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        let file_path = file_path.into();
        if file_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFilePath);
        }

        touch::ensure(&file_path, &file, diag.as_ref());

        Ok(Self {
            file_path,
            file,
            diag,
        })
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Append `chunk`. Failures are reported, never returned.
    pub fn write(&mut self, chunk: &[u8]) -> WriteReport {
        let persisted = writer::append_chunk(&self.file_path, &self.file, chunk)
            .or_report(self.diag.as_ref())
            .is_some();
        WriteReport {
            rotated: false,
            persisted,
        }
    }
}

/// The byte writer behind a [`WriteSink`].
pub enum Target {
    Rotating(RotatingWriter),
    Plain(PlainWriter),
}

impl Target {
    /// A rotating writer when the policy has a size budget, a plain one
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFilePath`] for an empty path.
    pub fn open(
        file_path: impl Into<PathBuf>,
        policy: &RotationPolicy,
        diag: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        if policy.size_limit().is_some() {
            RotatingWriter::new(file_path, policy, diag).map(Self::Rotating)
        } else {
            PlainWriter::new(file_path, policy.file, diag).map(Self::Plain)
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        match self {
            Self::Rotating(writer) => writer.file_path(),
            Self::Plain(writer) => writer.file_path(),
        }
    }

    pub fn write(&mut self, chunk: &[u8]) -> WriteReport {
        match self {
            Self::Rotating(writer) => writer.write(chunk),
            Self::Plain(writer) => writer.write(chunk),
        }
    }
}

/// Formats records with a layout and writes them one line at a time.
pub struct WriteSink<L> {
    target: Target,
    layout: L,
    tz_offset: Option<TzOffset>,
}

impl<L> WriteSink<L> {
    /// Open the file named by `file_path` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyFilePath`] for an empty path.
    pub fn open(
        file_path: impl Into<PathBuf>,
        policy: &RotationPolicy,
        layout: L,
        diag: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(Target::open(file_path, policy, diag)?, layout))
    }

    #[must_use]
    pub fn new(target: Target, layout: L) -> Self {
        Self {
            target,
            layout,
            tz_offset: None,
        }
    }

    /// Render timestamps at this offset (minutes east of UTC).
    #[must_use]
    pub fn with_tz_offset(mut self, tz_offset: Option<TzOffset>) -> Self {
        self.tz_offset = tz_offset;
        self
    }

    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        self.target.file_path()
    }

    /// Format `record`, terminate the line and write it.
    pub fn accept<R>(&mut self, record: &R) -> WriteReport
    where
        R: ?Sized,
        L: Layout<R>,
    {
        let mut line = self.layout.format(record, self.tz_offset);
        line.push_str(LINE_ENDING);
        self.target.write(line.as_bytes())
    }
}
