//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_inferred_from_path`] (from
//! [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IngestionOptions`])
//! - perform ingestion into an in-memory [`crate::types::DataSet`]
//! - optionally report success/failure/alerts to a [`crate::observability::Observer`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod unified;

pub use unified::{
    ingest_from_path, ingest_inferred_from_path, ExcelSheetSelection, IngestionFormat, IngestionOptions,
    IngestionRequest,
};
