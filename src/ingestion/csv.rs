//! CSV ingestion implementation.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Open a CSV reader with headers and the given field delimiter.
pub fn reader_from_path(path: impl AsRef<Path>, delimiter: u8) -> IngestionResult<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)?)
}

/// Ingest a comma-separated file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ; extra columns are ignored).
/// - Header names must be unique.
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = reader_from_path(path, b',')?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    reject_duplicate_headers(&headers)?;

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h.trim() == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;
        rows.push(parse_record(row_idx0, &record, schema, &col_idxs)?);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest a CSV file, inferring the schema from its contents.
///
/// See [`infer_schema_from_records`] for the inference rules.
pub fn ingest_csv_inferred_from_path(path: impl AsRef<Path>, delimiter: u8) -> IngestionResult<DataSet> {
    let mut rdr = reader_from_path(path, delimiter)?;
    ingest_csv_inferred_from_reader(&mut rdr)
}

/// Ingest CSV data from a reader, inferring the schema from its contents.
pub fn ingest_csv_inferred_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    let schema = infer_schema_from_records(&headers, &records)?;

    let col_idxs: Vec<usize> = (0..schema.fields.len()).collect();
    let rows = records
        .iter()
        .enumerate()
        .map(|(row_idx0, record)| parse_record(row_idx0, record, &schema, &col_idxs))
        .collect::<IngestionResult<Vec<_>>>()?;

    Ok(DataSet::new(schema, rows))
}

/// Infer a schema for the CSV file at `path` without keeping its rows.
pub fn infer_csv_schema(path: impl AsRef<Path>, delimiter: u8) -> IngestionResult<Schema> {
    let mut rdr = reader_from_path(path, delimiter)?;
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    infer_schema_from_records(&headers, &records)
}

/// Infer a column type for every header from all non-empty cells of that column:
///
/// - [`DataType::Int64`] if every cell parses as `i64`
/// - else [`DataType::Float64`] if every cell parses as `f64`
/// - else [`DataType::Bool`] if every cell is `true`/`false` (any case)
/// - else [`DataType::Utf8`]
///
/// Columns with no non-empty cells are `Utf8`. Duplicate or blank header names are rejected.
pub fn infer_schema_from_records(
    headers: &csv::StringRecord,
    records: &[csv::StringRecord],
) -> IngestionResult<Schema> {
    reject_duplicate_headers(headers)?;
    let mut fields: Vec<Field> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let name = header.trim();
        if name.is_empty() {
            return Err(IngestionError::SchemaMismatch {
                message: format!("header at column {} is empty", idx + 1),
            });
        }
        let cells = records.iter().map(|r| r.get(idx).unwrap_or(""));
        fields.push(Field::new(name, infer_column_type(cells)));
    }
    Ok(Schema::new(fields))
}

fn reject_duplicate_headers(headers: &csv::StringRecord) -> IngestionResult<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for name in headers.iter().map(str::trim).filter(|n| !n.is_empty()) {
        if !seen.insert(name) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("duplicate column '{name}' in headers"),
            });
        }
    }
    Ok(())
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let mut int = true;
    let mut float = true;
    let mut boolean = true;
    let mut any = false;

    for raw in cells {
        let s = raw.trim();
        if s.is_empty() {
            continue;
        }
        any = true;
        int = int && s.parse::<i64>().is_ok();
        float = float && s.parse::<f64>().is_ok();
        boolean = boolean && (s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"));
        if !int && !float && !boolean {
            break;
        }
    }

    match (any, int, float, boolean) {
        (false, ..) => DataType::Utf8,
        (true, true, _, _) => DataType::Int64,
        (true, false, true, _) => DataType::Float64,
        (true, false, false, true) => DataType::Bool,
        _ => DataType::Utf8,
    }
}

fn parse_record(
    row_idx0: usize,
    record: &csv::StringRecord,
    schema: &Schema,
    col_idxs: &[usize],
) -> IngestionResult<Vec<Value>> {
    // Report 1-based row number for users; +1 again because header is row 1.
    let user_row = row_idx0 + 2;
    schema
        .fields
        .iter()
        .zip(col_idxs.iter())
        .map(|(field, &csv_idx)| {
            let raw = record.get(csv_idx).unwrap_or("");
            parse_typed_value(user_row, &field.name, field.data_type, raw)
        })
        .collect()
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
    }
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
