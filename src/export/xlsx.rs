#![cfg(feature = "xlsx")]

//! Highlighted workbook export.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::error::{ExportError, ExportResult};
use crate::reconcile::KeySet;
use crate::types::{DataSet, Value};

/// Data rows available on one worksheet (the first of 1,048,576 rows holds the header).
pub const MAX_DATA_ROWS: usize = 1_048_575;

/// Options for [`write_highlighted_xlsx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxOptions {
    /// Worksheet name.
    pub sheet_name: String,
    /// Solid fill for highlighted rows, as `0xRRGGBB`.
    pub fill_rgb: u32,
    /// Render the header row in bold.
    pub bold_header: bool,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            fill_rgb: 0xFFFF00,
            bold_header: true,
        }
    }
}

/// Write `dataset` to a new workbook at `path`, filling every row whose `key_column` value is
/// in `keys`.
///
/// Returns the number of highlighted rows.
pub fn write_highlighted_xlsx(
    dataset: &DataSet,
    key_column: &str,
    keys: &KeySet,
    path: impl AsRef<Path>,
    options: &XlsxOptions,
) -> ExportResult<usize> {
    let key_idx = dataset
        .schema
        .index_of(key_column)
        .ok_or_else(|| ExportError::MissingColumn {
            column: key_column.to_owned(),
        })?;
    if dataset.row_count() > MAX_DATA_ROWS {
        return Err(ExportError::TooManyRows {
            rows: dataset.row_count(),
            limit: MAX_DATA_ROWS,
        });
    }

    let header = if options.bold_header {
        Format::new().set_bold()
    } else {
        Format::new()
    };
    let plain = Format::new();
    let filled = Format::new().set_background_color(Color::RGB(options.fill_rgb));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    for (col, name) in dataset.schema.field_names().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    let mut highlighted = 0;
    for (idx0, row) in dataset.rows.iter().enumerate() {
        let key = row.get(key_idx).unwrap_or(&Value::Null);
        let format = if keys.contains(key) {
            highlighted += 1;
            &filled
        } else {
            &plain
        };
        let sheet_row = (idx0 + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            write_cell(worksheet, sheet_row, col as u16, value, format)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(highlighted)
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, value: &Value, format: &Format) -> ExportResult<()> {
    match value {
        Value::Null => ws.write_blank(row, col, format)?,
        Value::Int64(v) => ws.write_number_with_format(row, col, *v as f64, format)?,
        Value::Float64(v) if v.is_finite() => ws.write_number_with_format(row, col, *v, format)?,
        Value::Float64(v) => ws.write_string_with_format(row, col, v.to_string(), format)?,
        Value::Bool(v) => ws.write_boolean_with_format(row, col, *v, format)?,
        Value::Utf8(s) => ws.write_string_with_format(row, col, s, format)?,
    };
    Ok(())
}
