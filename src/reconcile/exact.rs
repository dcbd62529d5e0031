//! Exact-match diff: "concatenate, then drop every duplicated row".

use std::collections::HashMap;

use crate::error::{ReconError, ReconResult};
use crate::types::{DataSet, Schema, Value};

use super::key::{row_key, RowKey};
use super::Side;

/// One row of a [`DifferingRows`] result.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    /// Dataset the row came from.
    pub side: Side,
    /// Index of the row in its source dataset.
    pub index: usize,
    /// Row values projected onto the compared columns.
    pub values: Vec<Value>,
}

/// Rows that appear in exactly one of two datasets.
///
/// Left rows come first, in source order, followed by right rows in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferingRows {
    /// Schema of the compared columns (field types taken from the left dataset).
    pub schema: Schema,
    pub rows: Vec<DiffRow>,
}

impl DifferingRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that came from `side` ("removed" for [`Side::Left`], "added" for [`Side::Right`]).
    pub fn from_side(&self, side: Side) -> impl Iterator<Item = &DiffRow> {
        self.rows.iter().filter(move |r| r.side == side)
    }

    /// The differing rows as a plain dataset over the compared columns.
    pub fn to_dataset(&self) -> DataSet {
        DataSet::new(
            self.schema.clone(),
            self.rows.iter().map(|r| r.values.clone()).collect(),
        )
    }
}

/// Exact-match diff over every column of `a`.
///
/// `b` must have the same set of columns (in any order); otherwise this fails with
/// [`ReconError::SchemaMismatch`] and the caller should pick the columns with [`diff_exact`].
pub fn diff_exact_shared(a: &DataSet, b: &DataSet) -> ReconResult<DifferingRows> {
    let left_only: Vec<&str> = a.schema.field_names().filter(|n| !b.schema.contains(n)).collect();
    let right_only: Vec<&str> = b.schema.field_names().filter(|n| !a.schema.contains(n)).collect();
    if !left_only.is_empty() || !right_only.is_empty() {
        return Err(ReconError::SchemaMismatch {
            message: format!(
                "column sets differ. left_only={left_only:?} right_only={right_only:?}; pass an explicit column list"
            ),
        });
    }
    let columns: Vec<&str> = a.schema.field_names().collect();
    diff_exact(a, b, &columns)
}

/// Exact-match diff over `columns`.
///
/// Every row of `a` and `b` is keyed by its values over `columns`. A row is returned iff its key
/// occurs exactly once across both datasets; a key seen twice or more is dropped in full, even
/// when all of its occurrences are on the same side.
///
/// Fails with [`ReconError::SchemaMismatch`] if `columns` is empty or names a column missing
/// from either dataset.
pub fn diff_exact(a: &DataSet, b: &DataSet, columns: &[&str]) -> ReconResult<DifferingRows> {
    if columns.is_empty() {
        return Err(ReconError::SchemaMismatch {
            message: "no columns to compare".to_string(),
        });
    }
    let a_idxs = resolve_columns(a, columns, Side::Left)?;
    let b_idxs = resolve_columns(b, columns, Side::Right)?;

    let a_keys: Vec<RowKey<'_>> = a.rows.iter().map(|r| row_key(r, &a_idxs)).collect();
    let b_keys: Vec<RowKey<'_>> = b.rows.iter().map(|r| row_key(r, &b_idxs)).collect();

    let mut counts: HashMap<&RowKey<'_>, usize> = HashMap::with_capacity(a_keys.len() + b_keys.len());
    for key in a_keys.iter().chain(b_keys.iter()) {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut rows = Vec::new();
    for (side, ds, keys, idxs) in [
        (Side::Left, a, &a_keys, &a_idxs),
        (Side::Right, b, &b_keys, &b_idxs),
    ] {
        for (index, key) in keys.iter().enumerate() {
            if counts.get(key).copied() == Some(1) {
                rows.push(DiffRow {
                    side,
                    index,
                    values: project(&ds.rows[index], idxs),
                });
            }
        }
    }

    let schema = Schema::new(a_idxs.iter().map(|&i| a.schema.fields[i].clone()).collect());
    Ok(DifferingRows { schema, rows })
}

fn resolve_columns(ds: &DataSet, columns: &[&str], side: Side) -> ReconResult<Vec<usize>> {
    columns
        .iter()
        .map(|&name| {
            ds.schema.index_of(name).ok_or_else(|| ReconError::SchemaMismatch {
                message: format!(
                    "column '{name}' not found in {side} dataset. columns={:?}",
                    ds.schema.field_names().collect::<Vec<_>>()
                ),
            })
        })
        .collect()
}

fn project(row: &[Value], idxs: &[usize]) -> Vec<Value> {
    idxs.iter()
        .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{diff_exact, diff_exact_shared};
    use crate::error::ReconError;
    use crate::reconcile::Side;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn xs(values: &[i64]) -> DataSet {
        DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Int64)]),
            values.iter().map(|v| vec![Value::Int64(*v)]).collect(),
        )
    }

    fn parcels(rows: &[(i64, &str)]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("bbl", DataType::Int64),
                Field::new("addr", DataType::Utf8),
            ]),
            rows.iter()
                .map(|(bbl, addr)| vec![Value::Int64(*bbl), Value::from(*addr)])
                .collect(),
        )
    }

    #[test]
    fn returns_rows_unique_to_either_side() {
        let a = parcels(&[(1, "x"), (2, "y")]);
        let b = parcels(&[(1, "x"), (3, "z")]);

        let diff = diff_exact(&a, &b, &["bbl", "addr"]).unwrap();

        assert_eq!(
            diff.to_dataset().rows,
            vec![
                vec![Value::Int64(2), Value::from("y")],
                vec![Value::Int64(3), Value::from("z")],
            ]
        );
        assert_eq!(diff.rows[0].side, Side::Left);
        assert_eq!(diff.rows[0].index, 1);
        assert_eq!(diff.rows[1].side, Side::Right);
        assert_eq!(diff.rows[1].index, 1);
    }

    #[test]
    fn duplicates_within_one_side_are_dropped() {
        let diff = diff_exact(&xs(&[1, 1]), &xs(&[]), &["x"]).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn duplicates_and_matches_are_all_dropped() {
        let diff = diff_exact(&xs(&[1, 1, 2]), &xs(&[2]), &["x"]).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn identical_inputs_produce_no_differences() {
        let a = parcels(&[(1, "x"), (2, "y"), (3, "z")]);
        assert!(diff_exact(&a, &a, &["bbl", "addr"]).unwrap().is_empty());
    }

    #[test]
    fn argument_order_does_not_change_the_differing_set() {
        let a = parcels(&[(1, "x"), (2, "y"), (4, "w")]);
        let b = parcels(&[(1, "x"), (3, "z")]);

        let mut ab = diff_exact(&a, &b, &["bbl", "addr"]).unwrap().to_dataset().rows;
        let mut ba = diff_exact(&b, &a, &["bbl", "addr"]).unwrap().to_dataset().rows;
        let by_bbl = |r: &Vec<Value>| match r[0] {
            Value::Int64(v) => v,
            _ => i64::MIN,
        };
        ab.sort_by_key(by_bbl);
        ba.sort_by_key(by_bbl);
        assert_eq!(ab, ba);
    }

    #[test]
    fn compares_only_selected_columns_and_projects_output() {
        let a = parcels(&[(1, "x"), (2, "y")]);
        let b = parcels(&[(1, "renamed"), (2, "y")]);

        let diff = diff_exact(&a, &b, &["bbl"]).unwrap();
        assert!(diff.is_empty());

        let diff = diff_exact(&a, &b, &["addr"]).unwrap();
        assert_eq!(diff.schema.field_names().collect::<Vec<_>>(), vec!["addr"]);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.from_side(Side::Left).count(), 1);
        assert_eq!(diff.from_side(Side::Right).count(), 1);
    }

    #[test]
    fn column_order_in_sources_may_differ() {
        let a = parcels(&[(1, "x"), (2, "y")]);
        let b = DataSet::new(
            Schema::new(vec![
                Field::new("addr", DataType::Utf8),
                Field::new("bbl", DataType::Int64),
            ]),
            vec![vec![Value::from("x"), Value::Int64(1)]],
        );

        let diff = diff_exact_shared(&a, &b).unwrap();
        assert_eq!(diff.to_dataset().rows, vec![vec![Value::Int64(2), Value::from("y")]]);
    }

    #[test]
    fn nulls_compare_equal() {
        let schema = Schema::new(vec![Field::new("x", DataType::Utf8)]);
        let a = DataSet::new(schema.clone(), vec![vec![Value::Null]]);
        let b = DataSet::new(schema, vec![vec![Value::Null]]);
        assert!(diff_exact(&a, &b, &["x"]).unwrap().is_empty());
    }

    #[test]
    fn integral_float_matches_int_column() {
        let a = xs(&[1, 2]);
        let b = DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Float64)]),
            vec![vec![Value::Float64(1.0)], vec![Value::Float64(2.5)]],
        );
        let diff = diff_exact(&a, &b, &["x"]).unwrap();
        assert_eq!(
            diff.to_dataset().rows,
            vec![vec![Value::Int64(2)], vec![Value::Float64(2.5)]]
        );
    }

    #[test]
    fn missing_column_is_a_schema_mismatch() {
        let a = parcels(&[(1, "x")]);
        let b = xs(&[1]);
        let err = diff_exact(&a, &b, &["bbl"]).unwrap_err();
        assert!(matches!(err, ReconError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("right dataset"));
    }

    #[test]
    fn empty_column_list_is_rejected() {
        let a = xs(&[1]);
        assert!(matches!(
            diff_exact(&a, &a, &[]),
            Err(ReconError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn shared_diff_rejects_extra_right_columns() {
        let a = xs(&[1]);
        let b = parcels(&[(1, "x")]);
        let err = diff_exact_shared(&a, &b).unwrap_err();
        assert!(err.to_string().contains("explicit column list"));
    }
}
