//! Grouped counts.

use std::collections::HashMap;

use crate::error::{ProcessingError, ProcessingResult};
use crate::reconcile::key::KeyPart;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Name of the count column produced by [`count_by`].
pub const COUNT_COLUMN: &str = "count";

/// Count rows per distinct value of `column`.
///
/// The result has two columns, `column` (same type as the source) and [`COUNT_COLUMN`]
/// (`Int64`), with one row per distinct non-null value in order of first occurrence. Nulls are
/// not counted. Values are grouped with the same normalization as reconciliation keys.
pub fn count_by(dataset: &DataSet, column: &str) -> ProcessingResult<DataSet> {
    let idx = dataset
        .schema
        .index_of(column)
        .ok_or_else(|| ProcessingError::MissingColumn {
            column: column.to_owned(),
        })?;

    let mut slots: HashMap<KeyPart<'_>, usize> = HashMap::new();
    let mut groups: Vec<(&Value, i64)> = Vec::new();
    for row in &dataset.rows {
        let value = row.get(idx).unwrap_or(&Value::Null);
        if value.is_null() {
            continue;
        }
        let slot = *slots.entry(KeyPart::of(value)).or_insert_with(|| {
            groups.push((value, 0));
            groups.len() - 1
        });
        groups[slot].1 += 1;
    }

    let schema = Schema::new(vec![
        dataset.schema.fields[idx].clone(),
        Field::new(COUNT_COLUMN, DataType::Int64),
    ]);
    let rows = groups
        .into_iter()
        .map(|(value, n)| vec![value.clone(), Value::Int64(n)])
        .collect();
    Ok(DataSet::new(schema, rows))
}

#[cfg(test)]
mod tests {
    use super::count_by;
    use crate::error::ProcessingError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn parcels() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("borough", DataType::Utf8),
            Field::new("bbl", DataType::Int64),
        ]);
        let rows = ["QN", "BK", "QN", "", "QN", "BK"]
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let boro = if b.is_empty() { Value::Null } else { Value::from(*b) };
                vec![boro, Value::Int64(i as i64)]
            })
            .collect();
        DataSet::new(schema, rows)
    }

    #[test]
    fn counts_in_first_occurrence_order() {
        let out = count_by(&parcels(), "borough").unwrap();
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["borough", "count"]);
        assert_eq!(
            out.rows,
            vec![
                vec![Value::from("QN"), Value::Int64(3)],
                vec![Value::from("BK"), Value::Int64(2)],
            ]
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        assert_eq!(
            count_by(&parcels(), "landuse").unwrap_err(),
            ProcessingError::MissingColumn {
                column: "landuse".to_string()
            }
        );
    }
}
