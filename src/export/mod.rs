//! Writing datasets and reconciliation results back to files.
//!
//! - [`csv`]: plain CSV (header + rows, nulls as empty cells)
//! - `xlsx` (feature `xlsx`): a single worksheet with rows highlighted by key membership

pub mod csv;
#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use csv::{to_csv_string, write_csv, write_csv_to_path};
#[cfg(feature = "xlsx")]
pub use xlsx::{write_highlighted_xlsx, XlsxOptions};
