//! `tracing-subscriber` setup.
//!
//! `RUST_LOG` wins over the verbosity flags when it is set and valid.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
    pub with_ansi: bool,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            format: LogFormat::default(),
            with_ansi: true,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// `-q` → error, none → warn, `-v` → info, `-vv` → debug, `-vvv` → trace.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => LevelFilter::ERROR,
            (false, 0) => LevelFilter::WARN,
            (false, 1) => LevelFilter::INFO,
            (false, 2) => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Install the global subscriber. Call once, before any work.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = config.level.to_string().to_lowercase();
            EnvFilter::new(format!("warn,parcel_recon={level}"))
        });

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(config, filter, Mutex::new(file), false);
        }
        None => install(config, filter, io::stderr, config.with_ansi),
    }
    Ok(())
}

fn install<W>(config: &LogConfig, filter: EnvFilter, writer: W, ansi: bool)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(writer)).init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().without_time().with_ansi(ansi).with_writer(writer))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().without_time().with_ansi(ansi).with_writer(writer))
            .init(),
    }
}
