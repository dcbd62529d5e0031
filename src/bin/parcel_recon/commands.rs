//! Subcommands, each built as a [`ReconJob`].

use std::io::{self, Write};
use std::sync::Arc;

use parcel_recon::error::JobResult;
use parcel_recon::export;
use parcel_recon::job::{DatasetSpec, JobReport, OutputSpec, ReconJob, ReconMode};
use parcel_recon::observability::{Observer, TracingObserver};

use crate::cli::{Command, ExactArgs, HighlightArgs, Inputs, OuterArgs};

pub fn job_for(command: &Command) -> JobResult<ReconJob> {
    let job = match command {
        Command::Exact(ExactArgs { inputs, columns }) => from_inputs(
            inputs,
            ReconMode::Exact {
                columns: (!columns.is_empty()).then(|| columns.clone()),
            },
        ),
        Command::Outer(OuterArgs {
            inputs,
            exclude,
            include_both,
        }) => from_inputs(
            inputs,
            ReconMode::Outer {
                exclude: exclude.clone(),
                include_both: *include_both,
            },
        ),
        Command::Highlight(HighlightArgs { inputs, key, xlsx }) => from_inputs(
            inputs,
            ReconMode::Membership {
                key: key.clone(),
                highlight_xlsx: xlsx.clone(),
            },
        ),
        Command::Run(args) => ReconJob::from_path(&args.config)?,
    };
    Ok(job)
}

fn from_inputs(inputs: &Inputs, mode: ReconMode) -> ReconJob {
    ReconJob {
        left: DatasetSpec::new(&inputs.left),
        right: DatasetSpec::new(&inputs.right),
        mode,
        output: OutputSpec {
            csv: inputs.out.clone(),
        },
    }
}

/// Run `job`, then print either the JSON report or, when no CSV output is configured, the result
/// table to stdout.
pub fn run(job: &ReconJob, json: bool) -> JobResult<JobReport> {
    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
    let report = job.run(Some(observer))?;
    tracing::info!(
        operation = %report.operation,
        differing = report.stats.differing,
        common_keys = report.stats.common_keys,
        outputs = report.outputs.len(),
        "done"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report).map_err(io::Error::from)?;
        writeln!(out)?;
    } else if job.output.csv.is_none() {
        export::write_csv(&report.table, &mut out)?;
    }
    out.flush()?;
    Ok(report)
}

/// 0 on success, 1 on error, 2 when `fail_on_diff` is set and the inputs did not reconcile.
pub fn exit_code(outcome: &JobResult<JobReport>, fail_on_diff: bool) -> i32 {
    match outcome {
        Ok(report) if fail_on_diff && report.has_differences() => 2,
        Ok(_) => 0,
        Err(_) => 1,
    }
}
