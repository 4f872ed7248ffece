//! Rotation policy and file open options.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Backups kept when the policy does not say otherwise.
pub const DEFAULT_MAX_BACKUPS: u32 = 5;

/// Permission bits applied to newly created log files.
pub const DEFAULT_MODE: u32 = 0o644;

/// Flags used when the live file has to be created. They never apply to a
/// file that already exists, so existing content always survives a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenFlag {
    #[default]
    #[serde(alias = "a")]
    Append,
    #[serde(alias = "w")]
    Truncate,
}

/// Text encoding of written records. Records are Rust strings, so UTF-8
/// is the only representation the writer emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf8", alias = "utf-8", alias = "UTF-8")]
    Utf8,
}

/// Options applied whenever the writer creates or opens the live file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    #[serde(default)]
    pub flags: OpenFlag,
    #[serde(default)]
    pub encoding: Encoding,
    /// Unix permission bits for newly created files. Ignored elsewhere.
    #[serde(default = "default_mode")]
    pub mode: u32,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            flags: OpenFlag::default(),
            encoding: Encoding::default(),
            mode: default_mode(),
        }
    }
}

impl FileOptions {
    #[must_use]
    pub const fn with_flags(mut self, flags: OpenFlag) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// `std::fs::OpenOptions` for creating the live file with these options.
    pub(crate) fn create_options(&self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        match self.flags {
            OpenFlag::Append => options.append(true),
            OpenFlag::Truncate => options.write(true).truncate(true),
        };
        self.apply_mode(&mut options);
        options
    }

    /// `std::fs::OpenOptions` for appending one chunk to the live file.
    pub(crate) fn append_options(&self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        options.append(true).create(true);
        self.apply_mode(&mut options);
        options
    }

    #[cfg(unix)]
    fn apply_mode(&self, options: &mut std::fs::OpenOptions) {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(self.mode);
    }

    #[cfg(not(unix))]
    fn apply_mode(&self, _options: &mut std::fs::OpenOptions) {}
}

const fn default_mode() -> u32 {
    DEFAULT_MODE
}

/// Size budget and retention for a rotating log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the live file reaches this many bytes. `None` or zero
    /// disables rotation.
    pub max_size_bytes: Option<u64>,
    /// Backups to retain. `None` means [`DEFAULT_MAX_BACKUPS`], zero is
    /// treated as one.
    pub max_backups: Option<u32>,
    pub file: FileOptions,
}

impl RotationPolicy {
    #[must_use]
    pub const fn new(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes: Some(max_size_bytes),
            max_backups: None,
            file: FileOptions {
                flags: OpenFlag::Append,
                encoding: Encoding::Utf8,
                mode: DEFAULT_MODE,
            },
        }
    }

    #[must_use]
    pub const fn with_max_backups(mut self, max_backups: u32) -> Self {
        self.max_backups = Some(max_backups);
        self
    }

    #[must_use]
    pub const fn with_file_options(mut self, file: FileOptions) -> Self {
        self.file = file;
        self
    }

    /// The size budget if rotation is enabled.
    #[must_use]
    pub fn size_limit(&self) -> Option<u64> {
        self.max_size_bytes.filter(|&limit| limit > 0)
    }

    /// Number of backups after normalization: absent -> 5, zero -> 1.
    #[must_use]
    pub fn backups(&self) -> u32 {
        match self.max_backups {
            None => DEFAULT_MAX_BACKUPS,
            Some(0) => 1,
            Some(n) => n,
        }
    }

    /// The size budget, or [`ConfigError::InvalidMaxSize`] if rotation is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxSize`] when the budget is missing or
    /// zero.
    pub fn require_size_limit(&self) -> Result<u64, ConfigError> {
        self.size_limit()
            .ok_or(ConfigError::InvalidMaxSize(self.max_size_bytes))
    }
}
