//! `parcel-recon` loads two tabular extracts of the same parcel/tax-lot domain into in-memory
//! [`types::DataSet`]s and reconciles them.
//!
//! ## Reconciliation
//!
//! - [`reconcile::diff_exact`]: rows present in exactly one input (full-row equality)
//! - [`reconcile::diff_outer`]: full outer join on the shared columns, each row tagged
//!   `left_only` / `right_only` / `both`
//! - [`reconcile::key_membership`]: key values of the first input also found in the second,
//!   used to highlight rows on export
//!
//! ## Ingestion
//!
//! **File formats (auto-detected by extension):**
//!
//! - **Delimited text**: `.csv`, `.tsv` (tab), `.txt`
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! Ingestion either validates against a user-provided [`types::Schema`] or infers one. Supported
//! logical types are:
//!
//! - [`types::DataType::Int64`]
//! - [`types::DataType::Float64`]
//! - [`types::DataType::Bool`]
//! - [`types::DataType::Utf8`]
//!
//! Empty cells map to [`types::Value::Null`].
//!
//! ```no_run
//! use parcel_recon::ingestion::{ingest_inferred_from_path, IngestionOptions};
//! use parcel_recon::reconcile::diff_outer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = IngestionOptions::default();
//! let footprints = ingest_inferred_from_path("Q2_fp_nullOR0.csv", &opts)?;
//! let parcels = ingest_inferred_from_path("Q2_parcel_list.csv", &opts)?;
//!
//! let joined = diff_outer(&footprints, &parcels, &["building_fp"])?;
//! let differences = joined.differences();
//! println!("{} rows differ", differences.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified ingestion entrypoints and format-specific implementations
//! - [`types`]: schema + in-memory dataset types
//! - [`reconcile`]: exact diff, outer join, key membership
//! - [`processing`]: filters, grouped counts and derived columns
//! - [`export`]: CSV and highlighted `.xlsx` writers
//! - [`job`]: JSON-configured end-to-end runs
//! - [`observability`]: observer hooks (tracing, file, composite)
//! - [`error`]: error types for every layer

pub mod error;
pub mod export;
pub mod ingestion;
pub mod job;
pub mod observability;
pub mod processing;
pub mod reconcile;
pub mod types;

pub use error::{
    ExportError, ExportResult, IngestionError, IngestionResult, JobError, JobResult, ProcessingError,
    ProcessingResult, ReconError, ReconResult,
};
