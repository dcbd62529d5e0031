#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::reconcile::key::is_exact_i64;
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::csv::parse_bool;

/// Ingest a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Validates that all schema fields exist as headers
/// - Reads remaining rows and converts cells into typed `Value`s
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    ingest_ranges(load_ranges(path, single(sheet_name))?, schema)
}

/// Ingest multiple sheets from a workbook and concatenate all rows into one `DataSet`.
///
/// - If `sheet_names` is `None`, ingests **all sheets** in workbook order.
/// - If `sheet_names` is `Some(&[...])`, ingests only those sheets (in the provided order).
///
/// All selected sheets must contain every schema column.
pub fn ingest_excel_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    ingest_ranges(load_ranges(path, multiple(sheet_names))?, schema)
}

/// Like [`ingest_excel_from_path`], inferring the schema from the sheet.
///
/// Inference per column, over non-empty cells: integers (or integral floats) → `Int64`, any
/// other number → `Float64`, booleans → `Bool`, anything else or a mix → `Utf8`.
pub fn ingest_excel_inferred_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> IngestionResult<DataSet> {
    ingest_ranges_inferred(load_ranges(path, single(sheet_name))?)
}

/// Like [`ingest_excel_workbook_from_path`], inferring the schema from the first selected sheet.
pub fn ingest_excel_workbook_inferred_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
) -> IngestionResult<DataSet> {
    ingest_ranges_inferred(load_ranges(path, multiple(sheet_names))?)
}

enum Sheets<'a> {
    First,
    All,
    Named(Vec<&'a str>),
}

fn single(sheet_name: Option<&str>) -> Sheets<'_> {
    match sheet_name {
        Some(name) => Sheets::Named(vec![name]),
        None => Sheets::First,
    }
}

fn multiple<'a>(sheet_names: Option<&[&'a str]>) -> Sheets<'a> {
    match sheet_names {
        Some(names) => Sheets::Named(names.to_vec()),
        None => Sheets::All,
    }
}

fn load_ranges(path: impl AsRef<Path>, selection: Sheets<'_>) -> IngestionResult<Vec<(String, Range<Data>)>> {
    let mut workbook = open_workbook_auto(path)?;

    let all = workbook.sheet_names().to_vec();
    let sheets: Vec<String> = match selection {
        Sheets::First => all.into_iter().take(1).collect(),
        Sheets::All => all,
        Sheets::Named(names) => names.into_iter().map(str::to_string).collect(),
    };
    if sheets.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }

    sheets
        .into_iter()
        .map(|sheet| {
            let range = workbook.worksheet_range(&sheet)?;
            Ok((sheet, range))
        })
        .collect()
}

fn ingest_ranges(ranges: Vec<(String, Range<Data>)>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut all_rows: Vec<Vec<Value>> = Vec::new();
    for (sheet, range) in &ranges {
        let mut sheet_rows = ingest_sheet_range(sheet, range, schema)?;
        all_rows.append(&mut sheet_rows);
    }
    Ok(DataSet::new(schema.clone(), all_rows))
}

fn ingest_ranges_inferred(ranges: Vec<(String, Range<Data>)>) -> IngestionResult<DataSet> {
    let schema = match ranges.first() {
        Some((sheet, range)) => infer_sheet_schema(range).map_err(|e| wrap_schema_err_with_sheet(sheet, e))?,
        None => {
            return Err(IngestionError::SchemaMismatch {
                message: "workbook has no sheets".to_string(),
            });
        }
    };
    ingest_ranges(ranges, &schema)
}

fn ingest_sheet_range(sheet: &str, range: &Range<Data>, schema: &Schema) -> IngestionResult<Vec<Vec<Value>>> {
    let (header_row_idx, col_idxs) =
        build_header_projection(range, schema).map_err(|e| wrap_schema_err_with_sheet(sheet, e))?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row) in range.rows().enumerate().skip(header_row_idx + 1) {
        // Report 1-based row number (Excel-like).
        let user_row = idx0 + 1;

        // Trailing blank rows are common in exported workbooks.
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &col_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            out_row.push(convert_cell(user_row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }
    Ok(rows)
}

fn wrap_schema_err_with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::SchemaMismatch { message } => IngestionError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn find_header_row(range: &Range<Data>) -> IngestionResult<(usize, Vec<String>)> {
    range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| (idx0, row.iter().map(cell_to_header_string).collect()))
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })
}

fn build_header_projection(range: &Range<Data>, schema: &Schema) -> IngestionResult<(usize, Vec<usize>)> {
    let (header_row_idx, header_cells) = find_header_row(range)?;

    let mut col_idxs: Vec<usize> = Vec::with_capacity(schema.fields.len());
    for f in &schema.fields {
        match header_cells.iter().position(|h| h.trim() == f.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        f.name, header_cells
                    ),
                });
            }
        }
    }

    Ok((header_row_idx, col_idxs))
}

fn infer_sheet_schema(range: &Range<Data>) -> IngestionResult<Schema> {
    let (header_row_idx, header_cells) = find_header_row(range)?;

    let mut fields: Vec<Field> = Vec::new();
    for (col, header) in header_cells.iter().enumerate() {
        let name = header.trim();
        if name.is_empty() {
            continue;
        }
        if fields.iter().any(|f| f.name == name) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("duplicate column '{name}' in headers"),
            });
        }
        let cells = range
            .rows()
            .skip(header_row_idx + 1)
            .map(|row| row.get(col).unwrap_or(&Data::Empty));
        fields.push(Field::new(name, infer_cell_type(cells)));
    }
    Ok(Schema::new(fields))
}

fn infer_cell_type<'a>(cells: impl Iterator<Item = &'a Data>) -> DataType {
    let mut seen: Option<DataType> = None;
    for c in cells {
        let t = match c {
            Data::Empty => continue,
            Data::Int(_) => DataType::Int64,
            Data::Float(f) if is_exact_i64(*f) => DataType::Int64,
            Data::Float(_) => DataType::Float64,
            Data::Bool(_) => DataType::Bool,
            _ => return DataType::Utf8,
        };
        seen = Some(match (seen, t) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int64), DataType::Float64) | (Some(DataType::Float64), DataType::Int64) => {
                DataType::Float64
            }
            _ => return DataType::Utf8,
        });
    }
    seen.unwrap_or(DataType::Utf8)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if is_exact_i64(*f) => (*f as i64).to_string(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if matches!(c, Data::Empty) {
        return Ok(Value::Null);
    }
    if let Data::String(s) = c {
        if s.trim().is_empty() {
            return Ok(Value::Null);
        }
    }

    let parse_err = |raw: String, message: String| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw,
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Bool => match c {
            Data::Bool(b) => Ok(Value::Bool(*b)),
            Data::Int(i) => Ok(Value::Bool(*i != 0)),
            Data::Float(f) => Ok(Value::Bool(*f != 0.0)),
            Data::String(s) => parse_bool(s.trim())
                .map(Value::Bool)
                .map_err(|m| parse_err(s.clone(), m)),
            _ => Err(parse_err(c.to_string(), "expected bool".to_string())),
        },
        DataType::Int64 => match c {
            Data::Int(i) => Ok(Value::Int64(*i)),
            Data::Float(f) if is_exact_i64(*f) => Ok(Value::Int64(*f as i64)),
            Data::Float(_) => Err(parse_err(
                c.to_string(),
                "expected integer (got non-integer or out of range float)".to_string(),
            )),
            Data::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| parse_err(s.clone(), e.to_string())),
            _ => Err(parse_err(c.to_string(), "expected integer".to_string())),
        },
        DataType::Float64 => match c {
            Data::Float(f) => Ok(Value::Float64(*f)),
            Data::Int(i) => Ok(Value::Float64(*i as f64)),
            Data::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| parse_err(s.clone(), e.to_string())),
            _ => Err(parse_err(c.to_string(), "expected number".to_string())),
        },
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_owned(),
        Data::Float(f) if is_exact_i64(*f) => (*f as i64).to_string(),
        _ => c.to_string(),
    }
}
