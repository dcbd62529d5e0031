//! `parcel-recon`: reconcile two parcel tables from the command line.
//!
//! Exit status: 0 on success, 1 on error, 2 with `--fail-on-diff` when differences were found.

use std::io::{self, IsTerminal};

use clap::Parser;

mod cli;
mod commands;
mod logging;

use crate::cli::{Cli, LogFormatArg};
use crate::logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let outcome = commands::job_for(&cli.command).and_then(|job| commands::run(&job, cli.json));
    if let Err(error) = &outcome {
        eprintln!("error: {error}");
    }
    std::process::exit(commands::exit_code(&outcome, cli.fail_on_diff));
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::from_flags(cli.verbose, cli.quiet);
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = io::stderr().is_terminal();
    config
}
