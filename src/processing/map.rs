//! Per-row rewriting.

use crate::types::{DataSet, Value};

/// Rewrite every row of `dataset` with `mapper`, keeping the schema.
///
/// # Panics
///
/// If `mapper` changes the number of values in a row. Use [`DataSet::with_column`] to add one.
pub fn map<F>(dataset: &DataSet, mapper: F) -> DataSet
where
    F: FnMut(&[Value]) -> Vec<Value>,
{
    dataset.map_rows(mapper)
}

#[cfg(test)]
mod tests {
    use super::map;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn footprints() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("bbl", DataType::Int64),
            Field::new("zonedist1", DataType::Utf8),
            Field::new("heightroof", DataType::Float64),
        ]);

        DataSet::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::from("r6"), Value::Float64(30.0)],
                vec![Value::Int64(2), Value::from("c4-2"), Value::Null],
            ],
        )
    }

    #[test]
    fn normalizes_zoning_and_converts_roof_height() {
        let ds = footprints();
        let out = map(&ds, |row| {
            let zone = match &row[1] {
                Value::Utf8(s) => Value::Utf8(s.to_uppercase()),
                other => other.clone(),
            };
            let height = match &row[2] {
                Value::Float64(v) => Value::Float64(v * 0.3048),
                other => other.clone(),
            };
            vec![row[0].clone(), zone, height]
        });

        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.rows[0][1], Value::from("R6"));
        assert_eq!(out.rows[1], vec![Value::Int64(2), Value::from("C4-2"), Value::Null]);

        // input untouched
        assert_eq!(ds.rows[0][1], Value::from("r6"));
    }

    #[test]
    #[should_panic(expected = "mapped row length")]
    fn mapper_must_keep_row_width() {
        let ds = footprints();
        let _ = ds.map_rows(|_row| vec![Value::Int64(1)]);
    }
}
