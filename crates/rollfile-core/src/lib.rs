//! rollfile-core library.
//!
//! A synchronous, size-bounded rotating file writer for log appenders.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollfile_core::{MessagePassThrough, RotationPolicy, TracingDiagnostics, WriteSink};
//!
//! let policy = RotationPolicy::new(10 * 1024 * 1024).with_max_backups(3);
//! let mut sink = WriteSink::open("logs/app.log", &policy, MessagePassThrough, Arc::new(TracingDiagnostics))?;
//! sink.accept("service started");
//! # Ok::<(), rollfile_core::ConfigError>(())
//! ```
//!
//! # Conventions
//!
//! - **Errors**: construction returns [`ConfigError`]; nothing on the write
//!   path returns an error. Filesystem failures are [`IoFailure`]s handed to
//!   the injected [`DiagnosticSink`].
//! - **Logging**: only through [`TracingDiagnostics`], which emits `tracing`
//!   events (`warn!` for failures, `debug!` for rotation steps).

pub mod backup;
pub mod config;
pub mod diag;
pub mod error;
pub mod layout;
pub mod policy;
pub mod sink;
pub mod touch;
pub mod writer;

pub use backup::{backup_index, BackupRenamer, ShiftReport};
pub use config::{configure, configure_on, load_config, AppenderConfig};
pub use diag::{
    DiagnosticSink, NullDiagnostics, RecordedFailure, RecordingDiagnostics, StderrDiagnostics,
    TraceEvent, TracingDiagnostics,
};
pub use error::{ConfigError, ErrorCode, FsOp, IoFailure};
pub use layout::{BasicLayout, ConfiguredLayout, Layout, LogRecord, MessagePassThrough, TzOffset};
pub use policy::{Encoding, FileOptions, OpenFlag, RotationPolicy, DEFAULT_MAX_BACKUPS, DEFAULT_MODE};
pub use sink::{PlainWriter, Target, WriteSink, LINE_ENDING};
pub use touch::Touch;
pub use writer::{RotatingWriter, WriteReport};
