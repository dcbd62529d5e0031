//! Core data model types.
//!
//! Files are ingested into an in-memory [`DataSet`], using a user-provided or inferred
//! [`Schema`] (a list of typed [`Field`]s).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field with the given name, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if a field with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value (`Int64` widened to `f64`); `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The logical type of this value; `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// String view of a `Utf8` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Renders values the way they are written to CSV: nulls are empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a dataset with no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Value at (`row`, `column`), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate all values of one column, in row order.
    ///
    /// Returns `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }

    /// Project the dataset onto `columns`, in the given order.
    ///
    /// Fails with [`ProcessingError::MissingColumn`] for the first name not in the schema.
    pub fn select(&self, columns: &[&str]) -> ProcessingResult<Self> {
        let mut idxs = Vec::with_capacity(columns.len());
        let mut fields = Vec::with_capacity(columns.len());
        for &name in columns {
            let idx = self
                .schema
                .index_of(name)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: name.to_owned(),
                })?;
            idxs.push(idx);
            fields.push(self.schema.fields[idx].clone());
        }
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row.get(i).cloned().unwrap_or(Value::Null)).collect())
            .collect();
        Ok(Self::new(Schema::new(fields), rows))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.fields.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    /// Append a column computed from each row. The new field goes last.
    ///
    /// Rows shorter than the schema are padded with `Null` first.
    pub fn with_column<F>(&self, field: Field, mut compute: F) -> Self
    where
        F: FnMut(&[Value]) -> Value,
    {
        let width = self.schema.len();
        let mut schema = self.schema.clone();
        schema.fields.push(field);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = Vec::with_capacity(width + 1);
                out.extend_from_slice(row);
                out.resize(width, Value::Null);
                out.push(compute(row.as_slice()));
                out
            })
            .collect();
        Self { schema, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, DataType, Field, Schema, Value};
    use crate::error::ProcessingError;

    fn parcels() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("bbl", DataType::Int64),
                Field::new("address", DataType::Utf8),
                Field::new("lotarea", DataType::Float64),
            ]),
            vec![
                vec![Value::Int64(1), Value::from("1 MAIN ST"), Value::Float64(2500.0)],
                vec![Value::Int64(2), Value::Null, Value::Float64(4000.0)],
            ],
        )
    }

    #[test]
    fn select_projects_in_requested_order() {
        let ds = parcels();
        let out = ds.select(&["lotarea", "bbl"]).unwrap();
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["lotarea", "bbl"]);
        assert_eq!(out.rows[1], vec![Value::Float64(4000.0), Value::Int64(2)]);
    }

    #[test]
    fn select_reports_missing_column() {
        let ds = parcels();
        assert_eq!(
            ds.select(&["bbl", "zonedist1"]).unwrap_err(),
            ProcessingError::MissingColumn {
                column: "zonedist1".to_string()
            }
        );
    }

    #[test]
    fn with_column_appends_computed_values() {
        let ds = parcels();
        let out = ds.with_column(Field::new("has_address", DataType::Bool), |row| {
            Value::Bool(!row[1].is_null())
        });
        assert_eq!(out.column_count(), 4);
        assert_eq!(out.value(0, "has_address"), Some(&Value::Bool(true)));
        assert_eq!(out.value(1, "has_address"), Some(&Value::Bool(false)));
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn display_renders_nulls_as_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float64(98.5).to_string(), "98.5");
        assert_eq!(Value::from("x").to_string(), "x");
    }

    #[test]
    fn data_type_serializes_lowercase() {
        let json = serde_json::to_string(&Field::new("bbl", DataType::Int64)).unwrap();
        assert_eq!(json, r#"{"name":"bbl","data_type":"int64"}"#);
    }
}
