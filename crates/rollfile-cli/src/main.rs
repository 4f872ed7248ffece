#![forbid(unsafe_code)]

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use rollfile_core::{
    AppenderConfig, ConfiguredLayout, DiagnosticSink, LogRecord, OpenFlag, StderrDiagnostics,
    TracingDiagnostics, configure, load_config,
};
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rollfile: append stdin lines to a size-rotated log file",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Appender config (TOML). Defaults to `<config dir>/rollfile/config.toml`
    /// when neither this nor `--file` is given.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Live log file path.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Rotation budget in bytes. Zero disables rotation.
    #[arg(long, value_name = "BYTES")]
    max_size: Option<u64>,

    /// Number of numbered backups to keep.
    #[arg(long, value_name = "N")]
    backups: Option<u32>,

    /// Open flags (`a` or `w`) used when the log file has to be created.
    #[arg(long, value_enum)]
    flags: Option<FlagsArg>,

    /// Permission bits for newly created files, in octal.
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    mode: Option<u32>,

    /// Line layout.
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Category stamped on every record.
    #[arg(long, default_value = "stdin")]
    category: String,

    /// Where filesystem failures are reported.
    #[arg(long, value_enum, default_value_t = DiagnosticsArg::Tracing)]
    diagnostics: DiagnosticsArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlagsArg {
    A,
    W,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Basic,
    MessagePassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiagnosticsArg {
    Tracing,
    Stderr,
}

impl From<FlagsArg> for OpenFlag {
    fn from(arg: FlagsArg) -> Self {
        match arg {
            FlagsArg::A => Self::Append,
            FlagsArg::W => Self::Truncate,
        }
    }
}

impl From<LayoutArg> for ConfiguredLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Basic => Self::Basic,
            LayoutArg::MessagePassThrough => Self::MessagePassThrough,
        }
    }
}

fn parse_mode(raw: &str) -> Result<u32, String> {
    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    u32::from_str_radix(digits, 8).map_err(|err| format!("invalid octal mode '{raw}': {err}"))
}

impl Cli {
    /// Resolve the appender config, then apply flag overrides on top.
    fn appender_config(&self) -> anyhow::Result<AppenderConfig> {
        let mut config = match (&self.config, &self.file) {
            (Some(path), _) => load_config(path)?,
            (None, Some(file)) => AppenderConfig::new(file),
            (None, None) => {
                let Some(path) = default_config_path().filter(|p| p.is_file()) else {
                    bail!("no log file given: pass --file or --config");
                };
                load_config(&path)?
            }
        };

        if let Some(file) = &self.file {
            config.filename.clone_from(file);
        }
        if let Some(max_size) = self.max_size {
            config.max_log_size = Some(max_size);
        }
        if let Some(backups) = self.backups {
            config.backups = Some(backups);
        }
        if let Some(flags) = self.flags {
            config.flags = flags.into();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(layout) = self.layout {
            config.layout = layout.into();
        }
        Ok(config)
    }

    fn diagnostics(&self) -> Arc<dyn DiagnosticSink> {
        match self.diagnostics {
            DiagnosticsArg::Tracing => Arc::new(TracingDiagnostics),
            DiagnosticsArg::Stderr => Arc::new(StderrDiagnostics),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rollfile").join("config.toml"))
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ROLLFILE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "rollfile=debug,info"
        } else {
            "rollfile=info,warn"
        })
    });

    let format = env::var("ROLLFILE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays free for piping.
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.appender_config()?;
    let mut sink = configure(&config, cli.diagnostics())
        .with_context(|| format!("Failed to open appender for {}", config.filename.display()))?;
    info!(path = %sink.file_path().display(), "appending stdin");

    let mut lines = 0usize;
    let mut dropped = 0usize;
    let mut rotations = 0usize;
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let report = sink.accept(&LogRecord::now(Level::INFO, cli.category.as_str(), line));
        lines += 1;
        if report.rotated {
            rotations += 1;
        }
        if !report.persisted {
            dropped += 1;
        }
    }

    info!(lines, rotations, dropped, "stdin closed");
    Ok(())
}
