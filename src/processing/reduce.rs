//! Reduction operations for [`crate::types::DataSet`].

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Count non-null values.
    CountNonNull,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - `Sum`/`Min`/`Max` keep the column type (`Int64` or `Float64`) and return [`Value::Null`]
///   when there are no non-null values or the column is not numeric.
/// - `Count` and `CountNonNull` always return `Value::Int64`.
/// - An `Int64` sum that overflows is a [`ProcessingError::InvalidValue`] at the row where it
///   overflowed.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> ProcessingResult<Value> {
    let idx = dataset
        .schema
        .index_of(column)
        .ok_or_else(|| ProcessingError::MissingColumn {
            column: column.to_owned(),
        })?;
    let cells = || dataset.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null));

    let out = match op {
        ReduceOp::Count => Value::Int64(dataset.row_count() as i64),
        ReduceOp::CountNonNull => Value::Int64(cells().filter(|v| !v.is_null()).count() as i64),
        ReduceOp::Sum | ReduceOp::Min | ReduceOp::Max => match dataset.schema.fields[idx].data_type {
            DataType::Int64 if op == ReduceOp::Sum => checked_sum(dataset, idx, column)?,
            DataType::Int64 => fold(
                cells().filter_map(|v| match v {
                    Value::Int64(i) => Some(*i),
                    _ => None,
                }),
                op,
            )
            .map(Value::Int64)
            .unwrap_or(Value::Null),
            DataType::Float64 => fold(cells().filter_map(Value::as_f64), op)
                .map(Value::Float64)
                .unwrap_or(Value::Null),
            DataType::Bool | DataType::Utf8 => Value::Null,
        },
    };
    Ok(out)
}

fn checked_sum(dataset: &DataSet, idx: usize, column: &str) -> ProcessingResult<Value> {
    let mut total: Option<i64> = None;
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let Some(Value::Int64(v)) = row.get(idx) else {
            continue;
        };
        let next = match total {
            None => *v,
            Some(acc) => acc.checked_add(*v).ok_or_else(|| ProcessingError::InvalidValue {
                row: row_idx,
                column: column.to_owned(),
                message: "integer sum overflows i64".to_string(),
            })?,
        };
        total = Some(next);
    }
    Ok(total.map(Value::Int64).unwrap_or(Value::Null))
}

fn fold<T>(values: impl Iterator<Item = T>, op: ReduceOp) -> Option<T>
where
    T: Copy + PartialOrd + std::ops::Add<Output = T>,
{
    values.reduce(|acc, v| match op {
        ReduceOp::Sum => acc + v,
        ReduceOp::Min if v < acc => v,
        ReduceOp::Max if v > acc => v,
        _ => acc,
    })
}
