//! Hashable comparison keys over [`Value`]s.
//!
//! [`Value`] cannot implement `Eq`/`Hash` directly because of `f64`. [`KeyPart`] borrows a value
//! and normalizes numbers so that rows can be grouped in hash maps:
//!
//! - integral floats compare equal to the matching integer (`Float64(1.0) == Int64(1)`)
//! - `-0.0` equals `0.0`, and all NaNs are equal to each other
//! - `Null` equals `Null`

use crate::types::Value;

/// A single normalized, borrowed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPart<'a> {
    Null,
    Int(i64),
    /// Bit pattern of a non-integral (or out of `i64` range) float.
    Float(u64),
    Bool(bool),
    Str(&'a str),
}

impl<'a> KeyPart<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Int64(v) => KeyPart::Int(*v),
            Value::Float64(v) => float_part(*v),
            Value::Bool(v) => KeyPart::Bool(*v),
            Value::Utf8(s) => KeyPart::Str(s.as_str()),
        }
    }
}

/// Owned form of [`KeyPart`], for sets that outlive the rows they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnedKey {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
}

impl From<KeyPart<'_>> for OwnedKey {
    fn from(part: KeyPart<'_>) -> Self {
        match part {
            KeyPart::Null => OwnedKey::Null,
            KeyPart::Int(v) => OwnedKey::Int(v),
            KeyPart::Float(bits) => OwnedKey::Float(bits),
            KeyPart::Bool(v) => OwnedKey::Bool(v),
            KeyPart::Str(s) => OwnedKey::Str(s.to_owned()),
        }
    }
}

impl From<&Value> for OwnedKey {
    fn from(value: &Value) -> Self {
        KeyPart::of(value).into()
    }
}

/// Whether `v` is integral and inside the `i64` range, i.e. `v as i64` is exact.
pub fn is_exact_i64(v: f64) -> bool {
    v.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&v)
}

// i64::MIN is exactly representable; i64::MAX rounds up to 2^63, so the upper bound is exclusive.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn float_part(v: f64) -> KeyPart<'static> {
    if v.is_nan() {
        return KeyPart::Float(f64::NAN.to_bits());
    }
    if is_exact_i64(v) {
        return KeyPart::Int(v as i64);
    }
    KeyPart::Float(v.to_bits())
}

/// The comparison key of a row: one [`KeyPart`] per compared column, in column order.
pub type RowKey<'a> = Vec<KeyPart<'a>>;

/// Build the key of `row` over the columns at `idxs`.
///
/// Indexes past the end of the row read as `Null`.
pub fn row_key<'a>(row: &'a [Value], idxs: &[usize]) -> RowKey<'a> {
    idxs.iter()
        .map(|&i| row.get(i).map(KeyPart::of).unwrap_or(KeyPart::Null))
        .collect()
}

/// Equality of two values under key normalization.
pub fn values_match(a: &Value, b: &Value) -> bool {
    KeyPart::of(a) == KeyPart::of(b)
}
