//! Record layouts.
//!
//! A layout turns a record plus an optional timezone offset into one line
//! of text. The sink adds the line terminator. Any
//! `Fn(&R, Option<TzOffset>) -> String` closure is a layout.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Offset from UTC in minutes, positive east of Greenwich.
pub type TzOffset = i32;

/// Formats records of type `R` into a single line.
pub trait Layout<R: ?Sized> {
    fn format(&self, record: &R, tz_offset: Option<TzOffset>) -> String;
}

impl<R, F> Layout<R> for F
where
    R: ?Sized,
    F: Fn(&R, Option<TzOffset>) -> String,
{
    fn format(&self, record: &R, tz_offset: Option<TzOffset>) -> String {
        self(record, tz_offset)
    }
}

/// A structured log event as handed over by a logging frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub category: String,
    pub message: String,
}

impl LogRecord {
    /// A record stamped with the current time.
    #[must_use]
    pub fn now(level: Level, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            category: category.into(),
            message: message.into(),
        }
    }
}

/// `[2026-10-17T09:30:00.123] [INFO] category - message`
///
/// The timestamp is rendered in the given offset, or in the system's local
/// zone when no offset is configured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BasicLayout;

impl BasicLayout {
    const TIMESTAMP: &'static str = "%Y-%m-%dT%H:%M:%S%.3f";

    fn timestamp(record: &LogRecord, tz_offset: Option<TzOffset>) -> String {
        match tz_offset.and_then(|minutes| FixedOffset::east_opt(minutes.saturating_mul(60))) {
            Some(offset) => record
                .timestamp
                .with_timezone(&offset)
                .format(Self::TIMESTAMP)
                .to_string(),
            None => record
                .timestamp
                .with_timezone(&Local)
                .format(Self::TIMESTAMP)
                .to_string(),
        }
    }
}

impl Layout<LogRecord> for BasicLayout {
    fn format(&self, record: &LogRecord, tz_offset: Option<TzOffset>) -> String {
        format!(
            "[{}] [{}] {} - {}",
            Self::timestamp(record, tz_offset),
            record.level,
            record.category,
            record.message
        )
    }
}

/// Writes the message and nothing else.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MessagePassThrough;

impl Layout<LogRecord> for MessagePassThrough {
    fn format(&self, record: &LogRecord, _tz_offset: Option<TzOffset>) -> String {
        record.message.clone()
    }
}

impl Layout<str> for MessagePassThrough {
    fn format(&self, record: &str, _tz_offset: Option<TzOffset>) -> String {
        record.to_owned()
    }
}

/// Layout selected by name in an appender config.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConfiguredLayout {
    #[default]
    Basic,
    #[serde(alias = "messagePassThrough")]
    MessagePassThrough,
}

impl Layout<LogRecord> for ConfiguredLayout {
    fn format(&self, record: &LogRecord, tz_offset: Option<TzOffset>) -> String {
        match self {
            Self::Basic => BasicLayout.format(record, tz_offset),
            Self::MessagePassThrough => MessagePassThrough.format(record, tz_offset),
        }
    }
}
