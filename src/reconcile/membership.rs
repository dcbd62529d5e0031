//! Key membership: which of `A`'s key values also occur in `B`.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ReconError, ReconResult};
use crate::types::{DataSet, Value};

use super::key::{KeyPart, OwnedKey};
use super::Side;

/// A deduplicated set of key values, kept in first-occurrence order.
#[derive(Clone, PartialEq, Default)]
pub struct KeySet {
    values: Vec<Value>,
    index: HashSet<OwnedKey>,
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySet").field("values", &self.values).finish()
    }
}

impl KeySet {
    /// Build a set from values, dropping repeats (under key normalization).
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut set = Self::default();
        for v in values {
            set.insert(v);
        }
        set
    }

    /// Add `value` unless an equal key is already present. Returns whether it was added.
    pub fn insert(&mut self, value: Value) -> bool {
        let added = self.index.insert(OwnedKey::from(&value));
        if added {
            self.values.push(value);
        }
        added
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Membership test; `Int64(1)` and `Float64(1.0)` are the same key.
    pub fn contains(&self, value: &Value) -> bool {
        self.index.contains(&OwnedKey::from(value))
    }

    /// Values in first-occurrence order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Key values of `a[key]` that also occur anywhere in `b[key]`.
///
/// The result is deduplicated and ordered by first occurrence in `a`. Fails with
/// [`ReconError::MissingColumn`] if either dataset lacks `key`.
pub fn key_membership(a: &DataSet, b: &DataSet, key: &str) -> ReconResult<KeySet> {
    let a_idx = key_index(a, key, Side::Left)?;
    let b_idx = key_index(b, key, Side::Right)?;

    let right: HashSet<KeyPart<'_>> = b
        .rows
        .iter()
        .map(|row| row.get(b_idx).map(KeyPart::of).unwrap_or(KeyPart::Null))
        .collect();

    let mut keys = KeySet::default();
    for row in &a.rows {
        let value = row.get(a_idx).unwrap_or(&Value::Null);
        if right.contains(&KeyPart::of(value)) && !keys.contains(value) {
            keys.insert(value.clone());
        }
    }
    Ok(keys)
}

/// For each row of `ds`, whether its `key` value is in `keys`.
///
/// `ds` may be either reconciled dataset or a third one sharing the same key domain.
pub fn highlight_mask(ds: &DataSet, key: &str, keys: &KeySet) -> ReconResult<Vec<bool>> {
    let idx = key_index(ds, key, Side::Left)?;
    Ok(ds
        .rows
        .iter()
        .map(|row| row.get(idx).is_some_and(|v| keys.contains(v)))
        .collect())
}

fn key_index(ds: &DataSet, key: &str, side: Side) -> ReconResult<usize> {
    ds.schema.index_of(key).ok_or_else(|| ReconError::MissingColumn {
        column: key.to_owned(),
        side,
    })
}
