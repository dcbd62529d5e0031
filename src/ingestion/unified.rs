//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`] (explicit schema) or
//! [`ingest_inferred_from_path`] (schema inferred from the file).
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If an [`crate::observability::Observer`] is provided, success/failure/alerts are reported
//!   to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::observability::{IngestionContext, IngestionStats, Observer, Severity};
use crate::types::{DataSet, Schema};

use super::csv;

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionFormat {
    /// Delimited text (`.csv`, `.tsv`, `.txt`).
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose sheet(s) when ingesting a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcelSheetSelection {
    /// Ingest the first sheet (default).
    #[default]
    First,
    /// Ingest a single named sheet.
    Sheet(String),
    /// Ingest all sheets and concatenate rows.
    AllSheets,
    /// Ingest only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Field delimiter for delimited text. If `None`, `.tsv` files use a tab and everything
    /// else a comma.
    pub delimiter: Option<u8>,
    /// Workbook-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn Observer>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("delimiter", &self.delimiter)
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            excel_sheet_selection: ExcelSheetSelection::default(),
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Ingest `path` using an explicit schema.
///
/// When an observer is configured, this function reports:
///
/// - `on_ingested` on success, with row/column counts
/// - `on_ingest_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use parcel_recon::ingestion::{ingest_from_path, IngestionOptions};
/// use parcel_recon::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), parcel_recon::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("bbl", DataType::Int64),
///     Field::new("address", DataType::Utf8),
/// ]);
///
/// // Uses `.csv` to select CSV ingestion.
/// let ds = ingest_from_path("Q2_parcel_list.csv", &schema, &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (tracing + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use parcel_recon::ingestion::{ingest_from_path, IngestionOptions};
/// use parcel_recon::observability::{Severity, TracingObserver};
/// use parcel_recon::types::{DataType, Field, Schema};
///
/// let schema = Schema::new(vec![Field::new("bbl", DataType::Int64)]);
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     alert_at_or_above: Severity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = ingest_from_path("does_not_exist.csv", &schema, &opts).unwrap_err();
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    run_observed(path, options, |fmt| match fmt {
        IngestionFormat::Csv => {
            let mut rdr = csv::reader_from_path(path, delimiter_for(path, options))?;
            csv::ingest_csv_from_reader(&mut rdr, schema)
        }
        IngestionFormat::Excel => ingest_excel_dispatch(path, Some(schema), &options.excel_sheet_selection),
    })
}

/// Ingest `path`, inferring the schema from its contents.
///
/// See [`csv::infer_schema_from_records`] for the rules used on delimited text.
pub fn ingest_inferred_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    run_observed(path, options, |fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_inferred_from_path(path, delimiter_for(path, options)),
        IngestionFormat::Excel => ingest_excel_dispatch(path, None, &options.excel_sheet_selection),
    })
}

fn run_observed<F>(path: &Path, options: &IngestionOptions, ingest: F) -> IngestionResult<DataSet>
where
    F: FnOnce(IngestionFormat) -> IngestionResult<DataSet>,
{
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let result = ingest(fmt);

    if let Some(obs) = options.observer.as_ref() {
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format: fmt,
        };
        match &result {
            Ok(ds) => obs.on_ingested(
                &ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.column_count(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_ingest_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn delimiter_for(path: &Path, options: &IngestionOptions) -> u8 {
    if let Some(d) = options.delimiter {
        return d;
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

fn severity_for_error(e: &IngestionError) -> Severity {
    match e {
        IngestionError::Io(_) => Severity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(calamine::Error::Io(_)) => Severity::Critical,
        #[cfg(feature = "excel")]
        IngestionError::Excel(_) => Severity::Error,
        IngestionError::SchemaMismatch { .. } => Severity::Error,
        IngestionError::ParseError { .. } => Severity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn ingest_excel_dispatch(
    path: &Path,
    schema: Option<&Schema>,
    sel: &ExcelSheetSelection,
) -> IngestionResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, schema, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match (sel, schema) {
            (ExcelSheetSelection::First, Some(schema)) => excel::ingest_excel_from_path(path, None, schema),
            (ExcelSheetSelection::First, None) => excel::ingest_excel_inferred_from_path(path, None),
            (ExcelSheetSelection::Sheet(name), Some(schema)) => {
                excel::ingest_excel_from_path(path, Some(name.as_str()), schema)
            }
            (ExcelSheetSelection::Sheet(name), None) => excel::ingest_excel_inferred_from_path(path, Some(name.as_str())),
            (ExcelSheetSelection::AllSheets, Some(schema)) => excel::ingest_excel_workbook_from_path(path, None, schema),
            (ExcelSheetSelection::AllSheets, None) => excel::ingest_excel_workbook_inferred_from_path(path, None),
            (ExcelSheetSelection::Sheets(names), schema) => {
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                match schema {
                    Some(schema) => excel::ingest_excel_workbook_from_path(path, Some(refs.as_slice()), schema),
                    None => excel::ingest_excel_workbook_inferred_from_path(path, Some(refs.as_slice())),
                }
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::SchemaMismatch {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

/// Convenience helper for callers that want an owned request object.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Schema to validate/parse values into; inferred when `None`.
    pub schema: Option<Schema>,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("schema_fields", &self.schema.as_ref().map(|s| s.fields.len()))
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request.
    pub fn run(&self) -> IngestionResult<DataSet> {
        match &self.schema {
            Some(schema) => ingest_from_path(&self.path, schema, &self.options),
            None => ingest_inferred_from_path(&self.path, &self.options),
        }
    }
}
