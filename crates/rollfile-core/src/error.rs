use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Machine-readable error codes for operators and log pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyFilePath,
    InvalidMaxSize,
    ConfigParseError,
    FileStatFailed,
    FileCreateFailed,
    FileAppendFailed,
    BackupRenameFailed,
    BackupRemoveFailed,
    DirectoryListFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyFilePath => "E1001",
            Self::InvalidMaxSize => "E1002",
            Self::ConfigParseError => "E1003",
            Self::FileStatFailed => "E5001",
            Self::FileCreateFailed => "E5002",
            Self::FileAppendFailed => "E5003",
            Self::BackupRenameFailed => "E5004",
            Self::BackupRemoveFailed => "E5005",
            Self::DirectoryListFailed => "E5006",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyFilePath => "Log file path is empty",
            Self::InvalidMaxSize => "Maximum log size must be positive",
            Self::ConfigParseError => "Appender config parse error",
            Self::FileStatFailed => "Log file stat failed",
            Self::FileCreateFailed => "Log file create failed",
            Self::FileAppendFailed => "Log file append failed",
            Self::BackupRenameFailed => "Backup rename failed",
            Self::BackupRemoveFailed => "Backup remove failed",
            Self::DirectoryListFailed => "Log directory listing failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyFilePath => Some("Set `filename` in the appender config."),
            Self::InvalidMaxSize => {
                Some("Use a positive `max_log_size`, or omit it to disable rotation.")
            }
            Self::ConfigParseError => Some("Fix syntax in the appender TOML file and retry."),
            Self::FileStatFailed | Self::FileCreateFailed | Self::DirectoryListFailed => {
                Some("Check that the log directory exists and is accessible.")
            }
            Self::FileAppendFailed => Some("Check disk space and write permissions."),
            Self::BackupRenameFailed | Self::BackupRemoveFailed => {
                Some("Check for foreign files or directories named like backups.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Invalid writer construction arguments. Raised before any filesystem
/// access takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The log file path was empty.
    #[error("{code}: you must specify a filename", code = ErrorCode::EmptyFilePath)]
    EmptyFilePath,

    /// Rotation was requested with a zero or missing size budget.
    #[error(
        "{code}: you must specify a positive file size, got {0:?}",
        code = ErrorCode::InvalidMaxSize
    )]
    InvalidMaxSize(Option<u64>),
}

impl ConfigError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyFilePath => ErrorCode::EmptyFilePath,
            Self::InvalidMaxSize(_) => ErrorCode::InvalidMaxSize,
        }
    }
}

// ---------------------------------------------------------------------------
// I/O failures
// ---------------------------------------------------------------------------

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    Stat,
    Create,
    Append,
    Rename,
    Remove,
    ReadDir,
}

impl FsOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Create => "create",
            Self::Append => "append",
            Self::Rename => "rename",
            Self::Remove => "remove",
            Self::ReadDir => "read_dir",
        }
    }

    /// Error code reported for failures of this operation.
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::Stat => ErrorCode::FileStatFailed,
            Self::Create => ErrorCode::FileCreateFailed,
            Self::Append => ErrorCode::FileAppendFailed,
            Self::Rename => ErrorCode::BackupRenameFailed,
            Self::Remove => ErrorCode::BackupRemoveFailed,
            Self::ReadDir => ErrorCode::DirectoryListFailed,
        }
    }
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed filesystem step. Recovered locally by reporting it to the
/// diagnostic sink; never returned from the write path.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {op} {shown} failed: {source}", code = .op.code(), shown = .path.display())]
pub struct IoFailure {
    pub op: FsOp,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl IoFailure {
    #[must_use]
    pub fn new(op: FsOp, path: &Path, source: io::Error) -> Self {
        Self {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Machine-readable code associated with this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.op.code()
    }

    /// Adapter for `map_err` on a raw `io::Result`.
    pub(crate) fn at(op: FsOp, path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::new(op, path, source)
    }
}
