use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diag::DiagnosticSink;
use crate::error::{ConfigError, ErrorCode};
use crate::layout::{ConfiguredLayout, TzOffset};
use crate::policy::{Encoding, FileOptions, OpenFlag, RotationPolicy, DEFAULT_MODE};
use crate::sink::WriteSink;

/// One file appender block, as written in TOML.
///
/// ```toml
/// filename = "logs/app.log"
/// max_log_size = 10485760
/// backups = 3
/// flags = "a"
/// mode = 0o644
///
/// [layout]
/// type = "basic"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppenderConfig {
    pub filename: PathBuf,
    /// Rotation budget in bytes. Absent or zero means the file grows
    /// without bound.
    #[serde(default)]
    pub max_log_size: Option<u64>,
    #[serde(default)]
    pub backups: Option<u32>,
    /// Minutes east of UTC used when rendering timestamps.
    #[serde(default)]
    pub timezone_offset: Option<TzOffset>,
    #[serde(default)]
    pub flags: OpenFlag,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default = "default_mode")]
    pub mode: u32,
    /// Write to `<filename>.<YYYY-MM-DD>.log`, dated when the appender is
    /// configured.
    #[serde(default)]
    pub date_suffix: bool,
    #[serde(default)]
    pub layout: ConfiguredLayout,
}

const fn default_mode() -> u32 {
    DEFAULT_MODE
}

impl AppenderConfig {
    /// A config for `filename` with every other field at its default.
    #[must_use]
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            max_log_size: None,
            backups: None,
            timezone_offset: None,
            flags: OpenFlag::default(),
            encoding: Encoding::default(),
            mode: DEFAULT_MODE,
            date_suffix: false,
            layout: ConfiguredLayout::default(),
        }
    }

    /// Parse a TOML appender block.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid appender block.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .with_context(|| format!("{}: Failed to parse appender config", ErrorCode::ConfigParseError))
    }

    #[must_use]
    pub const fn file_options(&self) -> FileOptions {
        FileOptions {
            flags: self.flags,
            encoding: self.encoding,
            mode: self.mode,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> RotationPolicy {
        RotationPolicy {
            max_size_bytes: self.max_log_size,
            max_backups: self.backups,
            file: self.file_options(),
        }
    }

    /// The live file path for a given day.
    #[must_use]
    pub fn resolve_path(&self, today: NaiveDate) -> PathBuf {
        if !self.date_suffix {
            return self.filename.clone();
        }
        let mut name = self.filename.as_os_str().to_owned();
        name.push(format!(".{}.log", today.format("%Y-%m-%d")));
        PathBuf::from(name)
    }
}

/// Load an appender block from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AppenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AppenderConfig>(&content)
        .with_context(|| format!("{}: Failed to parse {}", ErrorCode::ConfigParseError, path.display()))
}

/// Build the sink an appender block describes, dated with today's local
/// date when `date_suffix` is set.
///
/// # Errors
///
/// Returns [`ConfigError`] for an empty filename.
pub fn configure(
    config: &AppenderConfig,
    diag: Arc<dyn DiagnosticSink>,
) -> Result<WriteSink<ConfiguredLayout>, ConfigError> {
    configure_on(config, chrono::Local::now().date_naive(), diag)
}

/// [`configure`] with an explicit date for the file name.
///
/// # Errors
///
/// Returns [`ConfigError`] for an empty filename.
pub fn configure_on(
    config: &AppenderConfig,
    today: NaiveDate,
    diag: Arc<dyn DiagnosticSink>,
) -> Result<WriteSink<ConfiguredLayout>, ConfigError> {
    if config.filename.as_os_str().is_empty() {
        return Err(ConfigError::EmptyFilePath);
    }
    let path = config.resolve_path(today);
    tracing::debug!(path = %path.display(), "file appender configured");
    Ok(WriteSink::open(path, &config.policy(), config.layout, diag)?
        .with_tz_offset(config.timezone_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::RecordingDiagnostics;
    use crate::layout::LogRecord;
    use crate::sink::{Target, LINE_ENDING};
    use tempfile::TempDir;
    use tracing::Level;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppenderConfig::from_toml_str("filename = \"app.log\"").expect("parse");
        assert_eq!(config, AppenderConfig::new("app.log"));
        assert_eq!(config.policy().size_limit(), None);
        assert_eq!(config.policy().backups(), 5);
        assert_eq!(config.mode, 0o644);
        assert_eq!(config.layout, ConfiguredLayout::Basic);
    }

    #[test]
    fn full_config_parses() {
        let config = AppenderConfig::from_toml_str(
            r#"
filename = "logs/app.log"
max_log_size = 1024
backups = 0
timezone_offset = -300
flags = "w"
encoding = "utf-8"
mode = 0o600
date_suffix = true

[layout]
type = "message-pass-through"
"#,
        )
        .expect("parse");

        assert_eq!(config.max_log_size, Some(1024));
        assert_eq!(config.policy().backups(), 1);
        assert_eq!(config.timezone_offset, Some(-300));
        assert_eq!(config.flags, OpenFlag::Truncate);
        assert_eq!(config.mode, 0o600);
        assert!(config.date_suffix);
        assert_eq!(config.layout, ConfiguredLayout::MessagePassThrough);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = AppenderConfig::from_toml_str("filename = \"a\"\nmaxLogSize = 3").expect_err("unknown");
        assert!(format!("{err:#}").contains("maxLogSize"));
    }

    #[test]
    fn missing_filename_is_rejected() {
        assert!(AppenderConfig::from_toml_str("backups = 2").is_err());
    }

    #[test]
    fn date_suffix_is_appended() {
        let mut config = AppenderConfig::new("/var/log/app");
        assert_eq!(config.resolve_path(day()), PathBuf::from("/var/log/app"));
        config.date_suffix = true;
        assert_eq!(
            config.resolve_path(day()),
            PathBuf::from("/var/log/app.2026-10-17.log")
        );
    }

    #[test]
    fn load_config_names_the_file_on_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("appender.toml");
        std::fs::write(&path, "filename = ").expect("write");

        let err = load_config(&path).expect_err("bad toml");
        assert!(err.to_string().contains("appender.toml"));
        assert!(err.to_string().starts_with("E1003"));

        let missing = load_config(&tmp.path().join("nope.toml")).expect_err("missing");
        assert!(missing.to_string().contains("Failed to read"));
    }

    #[test]
    fn configure_builds_rotating_sink() {
        let tmp = TempDir::new().expect("tempdir");
        let mut config = AppenderConfig::new(tmp.path().join("app"));
        config.max_log_size = Some(64);
        config.date_suffix = true;
        config.timezone_offset = Some(0);

        let mut sink = configure_on(&config, day(), Arc::new(RecordingDiagnostics::new()))
            .expect("configure");

        assert!(matches!(sink.target(), Target::Rotating(_)));
        assert_eq!(sink.file_path(), tmp.path().join("app.2026-10-17.log"));

        let mut record = LogRecord::now(Level::WARN, "db", "slow query");
        record.timestamp = day()
            .and_hms_opt(8, 0, 0)
            .expect("valid time")
            .and_utc();
        sink.accept(&record);

        let content = std::fs::read_to_string(sink.file_path()).expect("read");
        assert_eq!(
            content,
            format!("[2026-10-17T08:00:00.000] [WARN] db - slow query{LINE_ENDING}")
        );
    }

    #[test]
    fn configure_without_size_builds_plain_sink() {
        let tmp = TempDir::new().expect("tempdir");
        let config = AppenderConfig::new(tmp.path().join("app.log"));

        let sink = configure(&config, Arc::new(RecordingDiagnostics::new())).expect("configure");

        assert!(matches!(sink.target(), Target::Plain(_)));
    }

    #[test]
    fn configure_rejects_empty_filename() {
        let config = AppenderConfig::new("");
        let err = configure(&config, Arc::new(RecordingDiagnostics::new()))
            .err()
            .expect("empty filename");
        assert_eq!(err, ConfigError::EmptyFilePath);
    }
}
