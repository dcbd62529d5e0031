//! Outer-join diff with a provenance indicator.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::error::{ReconError, ReconResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::key::{row_key, RowKey};

/// Default name of the indicator column produced by [`TaggedRows::to_dataset_with_indicator`].
pub const DEFAULT_INDICATOR_COLUMN: &str = "_merge";

/// Where a joined row was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    LeftOnly,
    RightOnly,
    Both,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::LeftOnly => "left_only",
            Provenance::RightOnly => "right_only",
            Provenance::Both => "both",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the outer join.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub provenance: Provenance,
    /// Source row in the left dataset (`None` for right-only rows).
    pub left_index: Option<usize>,
    /// Source row in the right dataset (`None` for left-only rows).
    pub right_index: Option<usize>,
    /// Values in [`TaggedRows::schema`] order; the absent side's payload columns are `Null`.
    pub values: Vec<Value>,
}

/// Result of [`diff_outer`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRows {
    /// Join key columns, then left-only payload columns, then right-only payload columns.
    pub schema: Schema,
    /// Names of the columns rows were matched on.
    pub key_columns: Vec<String>,
    pub rows: Vec<TaggedRow>,
}

impl TaggedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with the given provenance.
    pub fn count(&self, provenance: Provenance) -> usize {
        self.rows.iter().filter(|r| r.provenance == provenance).count()
    }

    /// Rows with the given provenance, in result order.
    pub fn with_provenance(&self, provenance: Provenance) -> impl Iterator<Item = &TaggedRow> {
        self.rows.iter().filter(move |r| r.provenance == provenance)
    }

    /// Only the rows not tagged [`Provenance::Both`].
    pub fn differences(&self) -> TaggedRows {
        TaggedRows {
            schema: self.schema.clone(),
            key_columns: self.key_columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.provenance != Provenance::Both)
                .cloned()
                .collect(),
        }
    }

    /// The joined rows as a dataset, without provenance.
    pub fn to_dataset(&self) -> DataSet {
        DataSet::new(
            self.schema.clone(),
            self.rows.iter().map(|r| r.values.clone()).collect(),
        )
    }

    /// The joined rows as a dataset with a trailing Utf8 indicator column
    /// (`left_only` / `right_only` / `both`).
    ///
    /// Fails with [`ReconError::SchemaMismatch`] if the joined schema already has a column named
    /// `column`.
    pub fn to_dataset_with_indicator(&self, column: &str) -> ReconResult<DataSet> {
        if self.schema.contains(column) {
            return Err(ReconError::SchemaMismatch {
                message: format!("indicator column '{column}' already exists in the joined rows"),
            });
        }
        let mut schema = self.schema.clone();
        schema.fields.push(Field::new(column, DataType::Utf8));
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut out = r.values.clone();
                out.push(Value::from(r.provenance.as_str()));
                out
            })
            .collect();
        Ok(DataSet::new(schema, rows))
    }
}

/// Full outer join of `a` and `b` on every shared column not listed in `exclude`.
///
/// - `exclude` names are dropped from whichever dataset has them. A name present in neither
///   dataset is a [`ReconError::SchemaMismatch`].
/// - Rows match when all key values are equal. Matching is one-to-one in order of occurrence:
///   the n-th left occurrence of a key pairs with the n-th right occurrence, and any surplus on
///   either side is tagged as one-sided.
/// - Output: left rows in order (`both` or `left_only`), then unmatched right rows in order.
///
/// Fails with [`ReconError::SchemaMismatch`] if no shared column remains to join on.
pub fn diff_outer(a: &DataSet, b: &DataSet, exclude: &[&str]) -> ReconResult<TaggedRows> {
    for &name in exclude {
        if !a.schema.contains(name) && !b.schema.contains(name) {
            return Err(ReconError::SchemaMismatch {
                message: format!("excluded column '{name}' is not present in either dataset"),
            });
        }
    }

    let kept = |ds: &DataSet| -> Vec<usize> {
        (0..ds.schema.len())
            .filter(|&i| !exclude.contains(&ds.schema.fields[i].name.as_str()))
            .collect()
    };
    let a_cols = kept(a);
    let b_cols = kept(b);

    let mut a_key = Vec::new();
    let mut b_key = Vec::new();
    let mut a_payload = Vec::new();
    for &i in &a_cols {
        let name = a.schema.fields[i].name.as_str();
        match b_cols.iter().find(|&&j| b.schema.fields[j].name == name) {
            Some(&j) => {
                a_key.push(i);
                b_key.push(j);
            }
            None => a_payload.push(i),
        }
    }
    if a_key.is_empty() {
        return Err(ReconError::SchemaMismatch {
            message: format!(
                "no shared columns to join on. left={:?} right={:?} excluded={exclude:?}",
                a.schema.field_names().collect::<Vec<_>>(),
                b.schema.field_names().collect::<Vec<_>>(),
            ),
        });
    }
    let b_payload: Vec<usize> = b_cols.into_iter().filter(|j| !b_key.contains(j)).collect();

    let mut fields: Vec<Field> = a_key.iter().map(|&i| a.schema.fields[i].clone()).collect();
    fields.extend(a_payload.iter().map(|&i| a.schema.fields[i].clone()));
    fields.extend(b_payload.iter().map(|&j| b.schema.fields[j].clone()));
    let key_columns = a_key
        .iter()
        .map(|&i| a.schema.fields[i].name.clone())
        .collect();

    let mut pending: HashMap<RowKey<'_>, VecDeque<usize>> = HashMap::new();
    for (j, row) in b.rows.iter().enumerate() {
        pending.entry(row_key(row, &b_key)).or_default().push_back(j);
    }

    let mut matched = vec![false; b.rows.len()];
    let mut rows = Vec::with_capacity(a.rows.len() + b.rows.len());

    for (i, row) in a.rows.iter().enumerate() {
        let hit = pending
            .get_mut(&row_key(row, &a_key))
            .and_then(|queue| queue.pop_front());

        let mut values = pick(row, &a_key);
        values.extend(pick(row, &a_payload));
        match hit {
            Some(j) => {
                matched[j] = true;
                values.extend(pick(&b.rows[j], &b_payload));
                rows.push(TaggedRow {
                    provenance: Provenance::Both,
                    left_index: Some(i),
                    right_index: Some(j),
                    values,
                });
            }
            None => {
                values.extend(nulls(b_payload.len()));
                rows.push(TaggedRow {
                    provenance: Provenance::LeftOnly,
                    left_index: Some(i),
                    right_index: None,
                    values,
                });
            }
        }
    }

    for (j, row) in b.rows.iter().enumerate() {
        if matched[j] {
            continue;
        }
        let mut values = pick(row, &b_key);
        values.extend(nulls(a_payload.len()));
        values.extend(pick(row, &b_payload));
        rows.push(TaggedRow {
            provenance: Provenance::RightOnly,
            left_index: None,
            right_index: Some(j),
            values,
        });
    }

    Ok(TaggedRows {
        schema: Schema::new(fields),
        key_columns,
        rows,
    })
}

fn pick(row: &[Value], idxs: &[usize]) -> Vec<Value> {
    idxs.iter()
        .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
        .collect()
}

fn nulls(n: usize) -> impl Iterator<Item = Value> {
    std::iter::repeat_n(Value::Null, n)
}

#[cfg(test)]
mod tests {
    use super::{diff_outer, Provenance, DEFAULT_INDICATOR_COLUMN};
    use crate::error::ReconError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn parcel_list(rows: &[(i64, &str)]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("bbl", DataType::Int64),
                Field::new("address", DataType::Utf8),
            ]),
            rows.iter()
                .map(|(bbl, addr)| vec![Value::Int64(*bbl), Value::from(*addr)])
                .collect(),
        )
    }

    fn footprints(rows: &[(i64, &str, Option<f64>)]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("bbl", DataType::Int64),
                Field::new("address", DataType::Utf8),
                Field::new("building_fp", DataType::Float64),
            ]),
            rows.iter()
                .map(|(bbl, addr, fp)| {
                    vec![
                        Value::Int64(*bbl),
                        Value::from(*addr),
                        fp.map(Value::Float64).unwrap_or(Value::Null),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn tags_every_row_once() {
        let a = footprints(&[(1, "x", Some(0.0)), (2, "y", None)]);
        let b = parcel_list(&[(1, "x"), (3, "z")]);

        let tagged = diff_outer(&a, &b, &["building_fp"]).unwrap();

        assert_eq!(tagged.key_columns, vec!["bbl", "address"]);
        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged.count(Provenance::Both), 1);
        assert_eq!(tagged.count(Provenance::LeftOnly), 1);
        assert_eq!(tagged.count(Provenance::RightOnly), 1);

        let lefts = tagged.rows.iter().filter_map(|r| r.left_index).count();
        let rights = tagged.rows.iter().filter_map(|r| r.right_index).count();
        assert_eq!(lefts, a.row_count());
        assert_eq!(rights, b.row_count());
    }

    #[test]
    fn differences_exclude_matched_rows() {
        let a = footprints(&[(1, "x", Some(0.0)), (2, "y", None)]);
        let b = parcel_list(&[(1, "x"), (3, "z")]);

        let diff = diff_outer(&a, &b, &["building_fp"]).unwrap().differences();
        assert_eq!(
            diff.to_dataset().rows,
            vec![
                vec![Value::Int64(2), Value::from("y")],
                vec![Value::Int64(3), Value::from("z")],
            ]
        );
    }

    #[test]
    fn payload_columns_are_carried_with_nulls_for_absent_side() {
        let a = footprints(&[(1, "x", Some(120.5)), (2, "y", Some(0.0))]);
        let b = parcel_list(&[(1, "x"), (3, "z")]);

        let tagged = diff_outer(&a, &b, &[]).unwrap();
        assert_eq!(tagged.key_columns, vec!["bbl", "address"]);
        assert_eq!(
            tagged.schema.field_names().collect::<Vec<_>>(),
            vec!["bbl", "address", "building_fp"]
        );
        assert_eq!(
            tagged.rows[0].values,
            vec![Value::Int64(1), Value::from("x"), Value::Float64(120.5)]
        );
        assert_eq!(tagged.rows[2].provenance, Provenance::RightOnly);
        assert_eq!(
            tagged.rows[2].values,
            vec![Value::Int64(3), Value::from("z"), Value::Null]
        );
    }

    #[test]
    fn duplicate_keys_pair_one_to_one() {
        let a = parcel_list(&[(1, "x"), (1, "x")]);
        let b = parcel_list(&[(1, "x"), (1, "x"), (1, "x")]);

        let tagged = diff_outer(&a, &b, &[]).unwrap();

        let both_left: Vec<_> = tagged.with_provenance(Provenance::Both).filter_map(|r| r.left_index).collect();
        let both_right: Vec<_> = tagged.with_provenance(Provenance::Both).filter_map(|r| r.right_index).collect();
        assert_eq!(both_left, vec![0, 1]);
        assert_eq!(both_right, vec![0, 1]);
        assert_eq!(tagged.count(Provenance::RightOnly), 1);
        assert_eq!(tagged.rows[2].right_index, Some(2));
    }

    #[test]
    fn indicator_column_is_appended() {
        let a = parcel_list(&[(1, "x"), (2, "y")]);
        let b = parcel_list(&[(1, "x")]);

        let ds = diff_outer(&a, &b, &[])
            .unwrap()
            .to_dataset_with_indicator(DEFAULT_INDICATOR_COLUMN)
            .unwrap();

        assert_eq!(ds.schema.index_of("_merge"), Some(2));
        assert_eq!(ds.value(0, "_merge"), Some(&Value::from("both")));
        assert_eq!(ds.value(1, "_merge"), Some(&Value::from("left_only")));
    }

    #[test]
    fn indicator_name_must_be_free() {
        let schema = Schema::new(vec![
            Field::new("bbl", DataType::Int64),
            Field::new("_merge", DataType::Utf8),
        ]);
        let a = DataSet::new(schema.clone(), vec![vec![Value::Int64(1), Value::from("both")]]);
        let b = DataSet::new(schema, vec![vec![Value::Int64(2), Value::from("both")]]);
        let tagged = diff_outer(&a, &b, &[]).unwrap();

        let err = tagged.to_dataset_with_indicator(DEFAULT_INDICATOR_COLUMN).unwrap_err();
        assert!(matches!(err, ReconError::SchemaMismatch { ref message } if message.contains("'_merge'")));

        let ds = tagged.to_dataset_with_indicator("provenance").unwrap();
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn unknown_excluded_column_is_rejected() {
        let a = parcel_list(&[(1, "x")]);
        let err = diff_outer(&a, &a, &["building_fp"]).unwrap_err();
        assert!(matches!(err, ReconError::SchemaMismatch { .. }));
    }

    #[test]
    fn disjoint_columns_are_rejected() {
        let a = parcel_list(&[(1, "x")]);
        let b = DataSet::new(
            Schema::new(vec![Field::new("network", DataType::Utf8)]),
            vec![vec![Value::from("Ridgewood")]],
        );
        let err = diff_outer(&a, &b, &[]).unwrap_err();
        assert!(err.to_string().contains("no shared columns"));

        let err = diff_outer(&a, &a, &["bbl", "address"]).unwrap_err();
        assert!(err.to_string().contains("no shared columns"));
    }
}
