//! Row filtering for [`crate::types::DataSet`].

use crate::error::{ProcessingError, ProcessingResult};
use crate::reconcile::key::values_match;
use crate::types::{DataSet, Value};

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&[Value]) -> bool,
{
    dataset.filter_rows(predicate)
}

/// A constraint on one column's values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Keep rows whose value matches one of the listed values. An empty list keeps every row.
    OneOf(Vec<Value>),
    /// Keep rows whose numeric value lies in `min..=max`. Nulls and non-numeric values are dropped.
    Range { min: f64, max: f64 },
}

impl ColumnFilter {
    /// Evaluate the filter for a single cell.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ColumnFilter::OneOf(values) => values.is_empty() || values.iter().any(|v| values_match(v, value)),
            ColumnFilter::Range { min, max } => value.as_f64().is_some_and(|v| v >= *min && v <= *max),
        }
    }
}

/// Keep rows satisfying every `(column, filter)` pair.
///
/// Returns [`ProcessingError::MissingColumn`] for the first column not in the schema.
pub fn apply_filters(dataset: &DataSet, filters: &[(&str, ColumnFilter)]) -> ProcessingResult<DataSet> {
    let resolved = filters
        .iter()
        .map(|(column, f)| {
            dataset
                .schema
                .index_of(column)
                .map(|idx| (idx, f))
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: (*column).to_owned(),
                })
        })
        .collect::<ProcessingResult<Vec<_>>>()?;

    Ok(dataset.filter_rows(|row| {
        resolved
            .iter()
            .all(|(idx, f)| f.matches(row.get(*idx).unwrap_or(&Value::Null)))
    }))
}

#[cfg(test)]
mod tests {
    use super::{apply_filters, filter, ColumnFilter};
    use crate::error::ProcessingError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("bbl", DataType::Int64),
            Field::new("boro", DataType::Utf8),
            Field::new("lotarea", DataType::Float64),
        ]);

        let rows = vec![
            vec![Value::Int64(4001), Value::from("QN"), Value::Float64(2500.0)],
            vec![Value::Int64(3002), Value::from("BK"), Value::Float64(1800.0)],
            vec![Value::Int64(4003), Value::from("QN"), Value::Null],
            vec![Value::Int64(2004), Value::from("BX"), Value::Float64(9000.0)],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn filter_rows_by_numeric_predicate() {
        let ds = sample_dataset();
        let idx = ds.schema.index_of("bbl").unwrap();

        let out = filter(&ds, |row| matches!(row.get(idx), Some(Value::Int64(v)) if *v > 4000));

        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.row_count(), 2);
        // Original unchanged
        assert_eq!(ds.row_count(), 4);
    }

    #[test]
    fn filter_rows_can_return_empty_dataset() {
        let ds = sample_dataset();
        let out = ds.filter_rows(|_| false);
        assert_eq!(out.schema, ds.schema);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn one_of_and_range_combine_with_and() {
        let ds = sample_dataset();
        let out = apply_filters(
            &ds,
            &[
                ("boro", ColumnFilter::OneOf(vec![Value::from("QN"), Value::from("BK")])),
                ("lotarea", ColumnFilter::Range { min: 2000.0, max: 5000.0 }),
            ],
        )
        .unwrap();

        assert_eq!(out.rows, vec![ds.rows[0].clone()]);
    }

    #[test]
    fn empty_one_of_keeps_everything() {
        let ds = sample_dataset();
        let out = apply_filters(&ds, &[("boro", ColumnFilter::OneOf(Vec::new()))]).unwrap();
        assert_eq!(out.row_count(), 4);
    }

    #[test]
    fn range_is_inclusive_and_drops_nulls() {
        let ds = sample_dataset();
        let out = apply_filters(&ds, &[("lotarea", ColumnFilter::Range { min: 1800.0, max: 9000.0 })]).unwrap();
        assert_eq!(out.row_count(), 3);
        assert!(out.rows.iter().all(|r| !r[2].is_null()));
    }

    #[test]
    fn one_of_matches_integral_floats_against_ints() {
        let ds = sample_dataset();
        let out = apply_filters(&ds, &[("bbl", ColumnFilter::OneOf(vec![Value::Float64(3002.0)]))]).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn unknown_column_is_reported() {
        let ds = sample_dataset();
        let err = apply_filters(&ds, &[("zonedist1", ColumnFilter::OneOf(Vec::new()))]).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::MissingColumn {
                column: "zonedist1".to_string()
            }
        );
    }
}
