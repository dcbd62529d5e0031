//! CSV export.

use std::io::{self, Write};
use std::path::Path;

use crate::error::{ExportError, ExportResult};
use crate::types::DataSet;

/// Write `dataset` as CSV to `writer`: one header row, then every row in order.
///
/// Nulls are written as empty cells; other values use their [`std::fmt::Display`] form.
pub fn write_csv<W: Write>(dataset: &DataSet, writer: W) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `dataset` to a CSV file at `path`, replacing any existing file.
pub fn write_csv_to_path(dataset: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(dataset, io::BufWriter::new(file))
}

/// Render `dataset` as a CSV string.
pub fn to_csv_string(dataset: &DataSet) -> ExportResult<String> {
    let mut buf = Vec::new();
    write_csv(dataset, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
