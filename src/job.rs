//! Declarative reconciliation jobs.
//!
//! A [`ReconJob`] names two inputs, one reconciliation mode and optional outputs. It is usually
//! loaded from a JSON file:
//!
//! ```json
//! {
//!   "left":  { "path": "Q2_fp_nullOR0.csv" },
//!   "right": { "path": "Q2_parcel_list.csv", "schema": [{"name": "bbl", "data_type": "int64"}] },
//!   "mode":  { "kind": "outer", "exclude": ["building_fp"] },
//!   "output": { "csv": "differences.csv" }
//! }
//! ```
//!
//! Relative paths in a job loaded with [`ReconJob::from_path`] are resolved against the job
//! file's directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{JobError, JobResult, ReconError};
use crate::export;
use crate::ingestion::{ExcelSheetSelection, IngestionFormat, IngestionOptions, IngestionRequest};
use crate::observability::{Observer, ReconContext, ReconOperation, ReconStats, Severity};
use crate::reconcile::{self, Provenance, DEFAULT_INDICATOR_COLUMN};
use crate::types::{DataSet, DataType, Field, Schema};

/// One input of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSpec {
    pub path: PathBuf,
    /// Columns to read and their types. Inferred from the file when absent.
    #[serde(default)]
    pub schema: Option<Schema>,
    /// Overrides extension-based format detection.
    #[serde(default)]
    pub format: Option<IngestionFormat>,
    /// Single-byte field delimiter for delimited text, e.g. `"\t"`.
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub sheets: ExcelSheetSelection,
}

impl DatasetSpec {
    /// A spec for `path` with every other setting at its default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: None,
            format: None,
            delimiter: None,
            sheets: ExcelSheetSelection::default(),
        }
    }

    fn request(&self, observer: Option<Arc<dyn Observer>>) -> JobResult<IngestionRequest> {
        let delimiter = match self.delimiter {
            None => None,
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => {
                return Err(JobError::Config {
                    message: format!("delimiter {c:?} for {} is not a single byte", self.path.display()),
                });
            }
        };
        Ok(IngestionRequest {
            path: self.path.clone(),
            schema: self.schema.clone(),
            options: IngestionOptions {
                format: self.format,
                delimiter,
                excel_sheet_selection: self.sheets.clone(),
                observer,
                alert_at_or_above: Severity::Critical,
            },
        })
    }
}

/// How the two inputs are compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconMode {
    /// Rows present in exactly one input. Without `columns`, both inputs must have the same
    /// column set.
    Exact {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    /// Full outer join on the shared columns minus `exclude`.
    Outer {
        #[serde(default)]
        exclude: Vec<String>,
        /// Also emit the matched (`both`) rows.
        #[serde(default)]
        include_both: bool,
    },
    /// Key values of the left input that also occur in the right one.
    Membership {
        key: String,
        /// Write the left input to this workbook with matching rows highlighted.
        #[serde(default)]
        highlight_xlsx: Option<PathBuf>,
    },
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSpec {
    #[serde(default)]
    pub csv: Option<PathBuf>,
}

/// A complete reconciliation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconJob {
    pub left: DatasetSpec,
    pub right: DatasetSpec,
    pub mode: ReconMode,
    #[serde(default)]
    pub output: OutputSpec,
}

/// Shape of one ingested input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Result of [`ReconJob::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub operation: ReconOperation,
    pub left: InputSummary,
    pub right: InputSummary,
    pub stats: ReconStats,
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
    /// The result table: differing rows (exact), joined rows with a `_merge` column (outer),
    /// or the common keys (membership).
    #[serde(skip)]
    pub table: DataSet,
}

impl JobReport {
    /// `true` when the inputs did not reconcile cleanly: any differing row for `exact`/`outer`,
    /// any common key for `membership`.
    pub fn has_differences(&self) -> bool {
        match self.operation {
            ReconOperation::Exact | ReconOperation::Outer => self.stats.differing > 0,
            ReconOperation::Membership => self.stats.common_keys > 0,
        }
    }
}

impl ReconJob {
    /// Parse a job from JSON text. Paths are used as written.
    pub fn from_json_str(json: &str) -> JobResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a job file, resolving relative paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> JobResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut job = Self::from_json_str(&text)?;
        if let Some(base) = path.parent() {
            job.resolve_paths(base);
        }
        Ok(job)
    }

    /// Prefix every relative path in the job with `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.left.path);
        resolve(&mut self.right.path);
        if let Some(p) = self.output.csv.as_mut() {
            resolve(p);
        }
        if let ReconMode::Membership {
            highlight_xlsx: Some(p), ..
        } = &mut self.mode
        {
            resolve(p);
        }
    }

    pub fn operation(&self) -> ReconOperation {
        match self.mode {
            ReconMode::Exact { .. } => ReconOperation::Exact,
            ReconMode::Outer { .. } => ReconOperation::Outer,
            ReconMode::Membership { .. } => ReconOperation::Membership,
        }
    }

    /// Ingest both inputs, reconcile them and write the configured outputs.
    ///
    /// Every stage reports to `observer` when one is given. Nothing is written if ingestion or
    /// reconciliation fails.
    pub fn run(&self, observer: Option<Arc<dyn Observer>>) -> JobResult<JobReport> {
        let operation = self.operation();
        tracing::debug!(%operation, left = %self.left.path.display(), right = %self.right.path.display(), "running job");

        let left = self.left.request(observer.clone())?.run()?;
        let right = self.right.request(observer.clone())?.run()?;

        let ctx = ReconContext {
            operation,
            left_rows: left.row_count(),
            right_rows: right.row_count(),
        };
        let (table, mut stats) = match self.reconcile(&left, &right) {
            Ok(out) => out,
            Err(e) => {
                if let Some(obs) = observer.as_ref() {
                    obs.on_recon_failure(&ctx, &e);
                }
                return Err(e.into());
            }
        };

        let mut outputs = Vec::new();
        if let ReconMode::Membership {
            key,
            highlight_xlsx: Some(xlsx_path),
        } = &self.mode
        {
            stats.highlighted = highlight(&left, key, &table, xlsx_path)?;
            report_export(observer.as_deref(), xlsx_path, left.row_count());
            outputs.push(xlsx_path.clone());
        }
        if let Some(obs) = observer.as_ref() {
            obs.on_reconciled(&ctx, stats);
        }

        if let Some(csv_path) = &self.output.csv {
            export::write_csv_to_path(&table, csv_path)?;
            report_export(observer.as_deref(), csv_path, table.row_count());
            outputs.push(csv_path.clone());
        }

        Ok(JobReport {
            operation,
            left: summary(&self.left.path, &left),
            right: summary(&self.right.path, &right),
            stats,
            outputs,
            table,
        })
    }

    fn reconcile(&self, left: &DataSet, right: &DataSet) -> Result<(DataSet, ReconStats), ReconError> {
        match &self.mode {
            ReconMode::Exact { columns } => {
                let diff = match columns {
                    Some(cols) => {
                        let cols: Vec<&str> = cols.iter().map(String::as_str).collect();
                        reconcile::diff_exact(left, right, &cols)?
                    }
                    None => reconcile::diff_exact_shared(left, right)?,
                };
                let stats = ReconStats {
                    differing: diff.len(),
                    left_only: diff.from_side(reconcile::Side::Left).count(),
                    right_only: diff.from_side(reconcile::Side::Right).count(),
                    ..Default::default()
                };
                Ok((diff.to_dataset(), stats))
            }
            ReconMode::Outer { exclude, include_both } => {
                let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
                let joined = reconcile::diff_outer(left, right, &exclude)?;
                let stats = ReconStats {
                    left_only: joined.count(Provenance::LeftOnly),
                    right_only: joined.count(Provenance::RightOnly),
                    both: joined.count(Provenance::Both),
                    differing: joined.len() - joined.count(Provenance::Both),
                    ..Default::default()
                };
                let rows = if *include_both { joined } else { joined.differences() };
                Ok((rows.to_dataset_with_indicator(DEFAULT_INDICATOR_COLUMN)?, stats))
            }
            ReconMode::Membership { key, .. } => {
                let keys = reconcile::key_membership(left, right, key)?;
                let data_type = left
                    .schema
                    .field(key)
                    .map(|f| f.data_type)
                    .unwrap_or(DataType::Utf8);
                let table = DataSet::new(
                    Schema::new(vec![Field::new(key.as_str(), data_type)]),
                    keys.values().iter().map(|v| vec![v.clone()]).collect(),
                );
                let stats = ReconStats {
                    common_keys: keys.len(),
                    ..Default::default()
                };
                Ok((table, stats))
            }
        }
    }
}

#[cfg(feature = "xlsx")]
fn highlight(left: &DataSet, key: &str, common: &DataSet, path: &Path) -> JobResult<usize> {
    let keys = reconcile::KeySet::from_values(common.rows.iter().filter_map(|r| r.first().cloned()));
    Ok(export::write_highlighted_xlsx(
        left,
        key,
        &keys,
        path,
        &export::XlsxOptions::default(),
    )?)
}

#[cfg(not(feature = "xlsx"))]
fn highlight(_left: &DataSet, _key: &str, _common: &DataSet, path: &Path) -> JobResult<usize> {
    Err(JobError::Config {
        message: format!(
            "cannot write {}: xlsx export not enabled (enable cargo feature 'xlsx')",
            path.display()
        ),
    })
}

fn report_export(observer: Option<&dyn Observer>, path: &Path, rows: usize) {
    if let Some(obs) = observer {
        obs.on_exported(path, rows);
    }
}

fn summary(path: &Path, ds: &DataSet) -> InputSummary {
    InputSummary {
        path: path.to_path_buf(),
        rows: ds.row_count(),
        columns: ds.column_count(),
    }
}
