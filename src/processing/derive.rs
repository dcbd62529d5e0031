//! Derived columns and null handling.
//!
//! Flags are written as `Utf8` `"Yes"`/`"No"` so they survive a CSV round trip as-is;
//! [`encode_yes_no`] converts them to `Int64` `1`/`0` for numeric consumers.

use crate::error::{ProcessingError, ProcessingResult};
use crate::reconcile::key::values_match;
use crate::types::{DataSet, DataType, Field, Value};

pub const YES: &str = "Yes";
pub const NO: &str = "No";

fn column_index(dataset: &DataSet, column: &str) -> ProcessingResult<usize> {
    dataset
        .schema
        .index_of(column)
        .ok_or_else(|| ProcessingError::MissingColumn {
            column: column.to_owned(),
        })
}

fn flag(on: bool) -> Value {
    Value::from(if on { YES } else { NO })
}

/// Append `new_column`: `"Yes"` where `source` matches one of `values`, `"No"` otherwise.
pub fn flag_membership(
    dataset: &DataSet,
    source: &str,
    values: &[Value],
    new_column: &str,
) -> ProcessingResult<DataSet> {
    let idx = column_index(dataset, source)?;
    Ok(dataset.with_column(Field::new(new_column, DataType::Utf8), |row| {
        let cell = row.get(idx).unwrap_or(&Value::Null);
        flag(values.iter().any(|v| values_match(v, cell)))
    }))
}

/// Append `new_column`: `"Yes"` where every column in `columns` is `"Yes"`, `"No"` otherwise.
pub fn flag_all(dataset: &DataSet, columns: &[&str], new_column: &str) -> ProcessingResult<DataSet> {
    let idxs = columns
        .iter()
        .map(|c| column_index(dataset, c))
        .collect::<ProcessingResult<Vec<_>>>()?;
    Ok(dataset.with_column(Field::new(new_column, DataType::Utf8), |row| {
        flag(idxs.iter().all(|&i| row.get(i).and_then(Value::as_str) == Some(YES)))
    }))
}

/// Append `new_column` holding the label mapped from the first character of `source`.
///
/// Nulls, empty and non-string values, and unmapped prefixes produce `Null`. Matching is
/// case-sensitive.
pub fn map_prefix(
    dataset: &DataSet,
    source: &str,
    mapping: &[(char, &str)],
    new_column: &str,
) -> ProcessingResult<DataSet> {
    let idx = column_index(dataset, source)?;
    Ok(dataset.with_column(Field::new(new_column, DataType::Utf8), |row| {
        row.get(idx)
            .and_then(Value::as_str)
            .and_then(|s| s.chars().next())
            .and_then(|first| mapping.iter().find(|(c, _)| *c == first))
            .map(|(_, label)| Value::from(*label))
            .unwrap_or(Value::Null)
    }))
}

/// Replace nulls in `column` with `value`.
///
/// `value` must have the column's type; otherwise [`ProcessingError::InvalidValue`] is returned
/// for the first row that would have been filled.
pub fn fill_null(dataset: &DataSet, column: &str, value: Value) -> ProcessingResult<DataSet> {
    let idx = column_index(dataset, column)?;
    let expected = dataset.schema.fields[idx].data_type;

    if let Some(found) = value.data_type().filter(|t| *t != expected) {
        if let Some(row) = dataset.rows.iter().position(|r| r.get(idx).is_none_or(Value::is_null)) {
            return Err(ProcessingError::InvalidValue {
                row,
                column: column.to_owned(),
                message: format!("fill value of type {found:?} does not match column type {expected:?}"),
            });
        }
    }

    let width = dataset.schema.len();
    let mut out = dataset.clone();
    for row in &mut out.rows {
        pad_row(row, width);
        if row[idx].is_null() {
            row[idx] = value.clone();
        }
    }
    Ok(out)
}

// Short rows read as null in every missing column.
fn pad_row(row: &mut Vec<Value>, width: usize) {
    if row.len() < width {
        row.resize(width, Value::Null);
    }
}

/// Drop rows whose `column` is null.
pub fn drop_nulls(dataset: &DataSet, column: &str) -> ProcessingResult<DataSet> {
    let idx = column_index(dataset, column)?;
    Ok(dataset.filter_rows(|row| row.get(idx).is_some_and(|v| !v.is_null())))
}

/// Convert `"Yes"`/`"No"` columns to `Int64` `1`/`0`. Nulls stay null.
///
/// Any other value is a [`ProcessingError::InvalidValue`].
pub fn encode_yes_no(dataset: &DataSet, columns: &[&str]) -> ProcessingResult<DataSet> {
    let idxs = columns
        .iter()
        .map(|c| column_index(dataset, c))
        .collect::<ProcessingResult<Vec<_>>>()?;

    let mut out = dataset.clone();
    for &idx in &idxs {
        let width = out.schema.len();
        for (row_idx, row) in out.rows.iter_mut().enumerate() {
            pad_row(row, width);
            let encoded = match &row[idx] {
                Value::Null => Value::Null,
                Value::Utf8(s) if s == YES => Value::Int64(1),
                Value::Utf8(s) if s == NO => Value::Int64(0),
                other => {
                    return Err(ProcessingError::InvalidValue {
                        row: row_idx,
                        column: dataset.schema.fields[idx].name.clone(),
                        message: format!("expected '{YES}' or '{NO}', got '{other}'"),
                    });
                }
            };
            row[idx] = encoded;
        }
        out.schema.fields[idx].data_type = DataType::Int64;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{drop_nulls, encode_yes_no, fill_null, flag_all, flag_membership, map_prefix};
    use crate::error::ProcessingError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn networks() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("network", DataType::Utf8),
            Field::new("boro", DataType::Utf8),
            Field::new("tier_2_2023", DataType::Utf8),
        ]);
        let rows = vec![
            vec![Value::from("Ridgewood"), Value::from("QN"), Value::from("Yes")],
            vec![Value::from("Crown Heights"), Value::from("BK"), Value::from("No")],
            vec![Value::from("Astoria"), Value::from("QN"), Value::from("Yes")],
            vec![Value::from("Richmond Hill - QN"), Value::from("QN"), Value::Null],
        ];
        DataSet::new(schema, rows)
    }

    fn priority(ds: &DataSet) -> DataSet {
        let listed = ["Ridgewood", "Richmond Hill - BK", "Richmond Hill - QN", "Crown Heights"]
            .map(Value::from);
        flag_membership(ds, "network", &listed, "dlm_priority").unwrap()
    }

    #[test]
    fn membership_flag_marks_listed_values() {
        let out = priority(&networks());
        let flags: Vec<_> = out.column("dlm_priority").unwrap().cloned().collect();
        assert_eq!(flags, ["Yes", "Yes", "No", "Yes"].map(Value::from).to_vec());
    }

    #[test]
    fn flag_all_requires_every_column_yes() {
        let out = flag_all(&priority(&networks()), &["tier_2_2023", "dlm_priority"], "sum").unwrap();
        let flags: Vec<_> = out.column("sum").unwrap().cloned().collect();
        assert_eq!(flags, ["Yes", "No", "No", "No"].map(Value::from).to_vec());
    }

    #[test]
    fn encode_yes_no_converts_and_retypes() {
        let ds = networks();
        let out = encode_yes_no(&ds, &["tier_2_2023"]).unwrap();
        assert_eq!(out.schema.field("tier_2_2023").unwrap().data_type, DataType::Int64);
        let codes: Vec<_> = out.column("tier_2_2023").unwrap().cloned().collect();
        assert_eq!(codes, vec![Value::Int64(1), Value::Int64(0), Value::Int64(1), Value::Null]);
    }

    #[test]
    fn encode_yes_no_rejects_other_values() {
        let err = encode_yes_no(&networks(), &["boro"]).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidValue { row: 0, .. }));
    }

    fn lots() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("zonedist1", DataType::Utf8),
            Field::new("ownertype", DataType::Utf8),
        ]);
        let rows = vec![
            vec![Value::from("R6"), Value::Null],
            vec![Value::from("C4-2"), Value::from("C")],
            vec![Value::from("BPC"), Value::from("X")],
            vec![Value::Null, Value::Null],
        ];
        DataSet::new(schema, rows)
    }

    const ZONING: [(char, &str); 4] = [
        ('C', "Commercial"),
        ('R', "Residential"),
        ('P', "Park"),
        ('M', "Manufacturing"),
    ];

    #[test]
    fn map_prefix_labels_known_prefixes() {
        let out = map_prefix(&lots(), "zonedist1", &ZONING, "zone_category").unwrap();
        let labels: Vec<_> = out.column("zone_category").unwrap().cloned().collect();
        assert_eq!(
            labels,
            vec![
                Value::from("Residential"),
                Value::from("Commercial"),
                Value::Null,
                Value::Null
            ]
        );

        let kept = drop_nulls(&out, "zone_category").unwrap();
        assert_eq!(kept.row_count(), 2);
    }

    #[test]
    fn fill_null_replaces_only_nulls() {
        let out = fill_null(&lots(), "ownertype", Value::from("Unknown")).unwrap();
        let owners: Vec<_> = out.column("ownertype").unwrap().cloned().collect();
        assert_eq!(owners, ["Unknown", "C", "X", "Unknown"].map(Value::from).to_vec());
    }

    #[test]
    fn fill_null_rejects_mismatched_type() {
        let err = fill_null(&lots(), "ownertype", Value::Int64(0)).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn short_rows_read_as_null() {
        let schema = Schema::new(vec![
            Field::new("network", DataType::Utf8),
            Field::new("tier_2_2023", DataType::Utf8),
        ]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::from("Ridgewood"), Value::from("Yes")],
                vec![Value::from("Mott Haven")],
            ],
        );

        let filled = fill_null(&ds, "tier_2_2023", Value::from("No")).unwrap();
        assert_eq!(filled.rows[1], vec![Value::from("Mott Haven"), Value::from("No")]);

        let encoded = encode_yes_no(&ds, &["tier_2_2023"]).unwrap();
        assert_eq!(encoded.rows[1], vec![Value::from("Mott Haven"), Value::Null]);

        let flagged = flag_all(&ds, &["tier_2_2023"], "sum").unwrap();
        assert_eq!(flagged.value(1, "sum"), Some(&Value::from("No")));
        assert_eq!(flagged.rows[1].len(), 3);
    }
}
