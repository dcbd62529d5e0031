//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "parcel-recon",
    version,
    about = "Compare two parcel/tax-lot tables and report the rows that differ",
    long_about = "Compare two tabular extracts (CSV/TSV, or workbooks with the 'excel' feature).\n\n\
                  exact      rows present in exactly one input\n\
                  outer      full outer join on shared columns, tagged left_only/right_only/both\n\
                  highlight  key values shared by both inputs, optionally as a highlighted .xlsx\n\
                  run        a job described by a JSON file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print the run report as JSON on stdout instead of the result table.
    #[arg(long, global = true)]
    pub json: bool,

    /// Exit with status 2 when the inputs do not reconcile cleanly.
    #[arg(long = "fail-on-diff", global = true)]
    pub fail_on_diff: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rows present in exactly one input.
    Exact(ExactArgs),

    /// Full outer join on the shared columns, keeping the non-matching rows.
    Outer(OuterArgs),

    /// Key values of LEFT that also occur in RIGHT.
    Highlight(HighlightArgs),

    /// Run a JSON job file.
    Run(RunArgs),
}

#[derive(Args)]
pub struct Inputs {
    /// First (left) table.
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Second (right) table.
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Write the result table to this CSV file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExactArgs {
    #[command(flatten)]
    pub inputs: Inputs,

    /// Columns to compare (default: all columns; both inputs must then have the same columns).
    #[arg(short, long, value_delimiter = ',', value_name = "COL")]
    pub columns: Vec<String>,
}

#[derive(Args)]
pub struct OuterArgs {
    #[command(flatten)]
    pub inputs: Inputs,

    /// Column to leave out of the join key (repeatable or comma-separated).
    #[arg(short, long, value_delimiter = ',', value_name = "COL")]
    pub exclude: Vec<String>,

    /// Also output the rows found in both inputs.
    #[arg(long = "include-both")]
    pub include_both: bool,
}

#[derive(Args)]
pub struct HighlightArgs {
    #[command(flatten)]
    pub inputs: Inputs,

    /// Key column present in both inputs.
    #[arg(short, long, value_name = "COL")]
    pub key: String,

    /// Write LEFT to this workbook with rows whose key is shared highlighted.
    #[arg(long, value_name = "PATH")]
    pub xlsx: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Job file.
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
