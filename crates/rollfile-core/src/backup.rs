//! Backup slot shifting.
//!
//! Backups live next to the live file as `<name>.1` (newest) through
//! `<name>.<max_backups>` (oldest). A rotation moves every retained file
//! one slot up, highest index first so nothing is overwritten before it
//! has been moved, leaving slot 1 free for the live file's content.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::diag::{DiagnosticSink, ReportExt, TraceEvent};
use crate::error::{FsOp, IoFailure};

/// Outcome of one [`BackupRenamer::shift`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShiftReport {
    /// Files moved one slot up, including the live file.
    pub renamed: usize,
    /// Backups deleted because they fell outside the retained window.
    pub evicted: usize,
    /// Steps that failed and were reported.
    pub failed: usize,
}

/// Shifts `<name>.<n>` to `<name>.<n+1>` for one live file.
#[derive(Debug, Clone)]
pub struct BackupRenamer {
    file_path: PathBuf,
    max_backups: u32,
}

impl BackupRenamer {
    /// `max_backups` is expected to be normalized already (at least 1).
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, max_backups: u32) -> Self {
        Self {
            file_path: file_path.into(),
            max_backups: max_backups.max(1),
        }
    }

    #[must_use]
    pub fn max_backups(&self) -> u32 {
        self.max_backups
    }

    /// Path of backup slot `index`.
    #[must_use]
    pub fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// Free slot 1 by moving the live file and every retained backup one
    /// slot up. Backups at or above `max_backups` are deleted first.
    ///
    /// Each failed step is reported to `diag` and skipped; the remaining
    /// steps still run.
    pub fn shift(&self, diag: &dyn DiagnosticSink) -> ShiftReport {
        let mut report = ShiftReport::default();

        let Some(mut entries) = self.list_entries(diag, &mut report) else {
            report.failed += 1;
            return report;
        };
        // Highest index first.
        entries.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        for (index, path) in entries {
            if index >= self.max_backups {
                match evict(&path, diag) {
                    Some(()) => report.evicted += 1,
                    None => report.failed += 1,
                }
            } else {
                match self.move_up(index, &path, diag) {
                    Some(()) => report.renamed += 1,
                    None => report.failed += 1,
                }
            }
        }

        report
    }

    /// Directory holding the live file and its backups.
    fn dir(&self) -> &Path {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// The live file and its numbered backups, unordered. A listing that
    /// cannot start is reported and yields `None`; an unreadable entry is
    /// reported, counted and skipped.
    fn list_entries(
        &self,
        diag: &dyn DiagnosticSink,
        report: &mut ShiftReport,
    ) -> Option<Vec<(u32, PathBuf)>> {
        let dir = self.dir();
        let listing = self
            .file_path
            .file_name()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name")
            })
            .and_then(|base| Ok((base, fs::read_dir(dir)?)))
            .map_err(IoFailure::at(FsOp::ReadDir, dir))
            .or_report(diag);
        let (base, listing) = listing?;

        let names = listing.map(|entry| entry.map(|entry| (entry.file_name(), entry.path())));
        Some(classify(base, dir, names, diag, report))
    }

    fn move_up(&self, index: u32, path: &Path, diag: &dyn DiagnosticSink) -> Option<()> {
        let target = self.backup_path(index + 1);
        // Clear the slot first. A failure here almost always means it was
        // already empty.
        let _ = fs::remove_file(&target);
        fs::rename(path, &target)
            .map_err(IoFailure::at(FsOp::Rename, path))
            .or_report(diag)?;
        diag.trace(TraceEvent::Renamed {
            from: path,
            to: &target,
        });
        Some(())
    }
}

fn evict(path: &Path, diag: &dyn DiagnosticSink) -> Option<()> {
    fs::remove_file(path)
        .map_err(IoFailure::at(FsOp::Remove, path))
        .or_report(diag)?;
    diag.trace(TraceEvent::Evicted { path });
    Some(())
}

/// Keep the entries that [`backup_index`] recognizes. Entry errors are
/// reported against `dir` and counted as failed steps.
fn classify<I>(
    base: &OsStr,
    dir: &Path,
    names: I,
    diag: &dyn DiagnosticSink,
    report: &mut ShiftReport,
) -> Vec<(u32, PathBuf)>
where
    I: IntoIterator<Item = io::Result<(OsString, PathBuf)>>,
{
    let mut entries = Vec::new();
    for name in names {
        let Some((name, path)) = name.map_err(IoFailure::at(FsOp::ReadDir, dir)).or_report(diag)
        else {
            report.failed += 1;
            continue;
        };
        if let Some(index) = backup_index(base, &name) {
            entries.push((index, path));
        }
    }
    entries
}

/// Classify a directory entry against the live file's base name.
///
/// Returns `Some(0)` for the live file itself, `Some(n)` for `<base>.<n>`
/// with `n` a positive decimal number, and `None` for anything else,
/// including files that merely share the prefix (`app.log.bak`,
/// `app.log-old`, `app.log.0`).
///
/// Names are compared as raw bytes, so bases that are not valid UTF-8 are
/// classified like any other.
#[must_use]
pub fn backup_index(base: impl AsRef<OsStr>, name: impl AsRef<OsStr>) -> Option<u32> {
    let rest = name
        .as_ref()
        .as_encoded_bytes()
        .strip_prefix(base.as_ref().as_encoded_bytes())?;
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.strip_prefix(b".")?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits)
        .ok()?
        .parse::<u32>()
        .ok()
        .filter(|&index| index > 0)
}
