//! Tabular reconciliation: compare two datasets and classify their rows.
//!
//! Three operations, all pure functions over already-loaded [`crate::types::DataSet`]s:
//!
//! - [`diff_exact()`] / [`diff_exact_shared()`]: rows present in exactly one input, compared by
//!   full-row value equality over an agreed column set. Any value tuple that occurs more than
//!   once across both inputs is dropped entirely, including repeats on a single side.
//! - [`diff_outer()`]: a full outer join on every shared (non-excluded) column, tagging each row
//!   `left_only`, `right_only` or `both`.
//! - [`key_membership()`]: the key values of the left dataset that also occur in the right one,
//!   used by [`crate::export`] to highlight rows.
//!
//! ## Example
//!
//! ```rust
//! use parcel_recon::reconcile::{diff_exact, key_membership};
//! use parcel_recon::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("bbl", DataType::Int64),
//!     Field::new("addr", DataType::Utf8),
//! ]);
//! let a = DataSet::new(
//!     schema.clone(),
//!     vec![
//!         vec![Value::Int64(1), Value::from("x")],
//!         vec![Value::Int64(2), Value::from("y")],
//!     ],
//! );
//! let b = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::from("x")],
//!         vec![Value::Int64(3), Value::from("z")],
//!     ],
//! );
//!
//! let diff = diff_exact(&a, &b, &["bbl", "addr"]).unwrap();
//! assert_eq!(
//!     diff.to_dataset().rows,
//!     vec![
//!         vec![Value::Int64(2), Value::from("y")],
//!         vec![Value::Int64(3), Value::from("z")],
//!     ]
//! );
//!
//! let common = key_membership(&a, &b, "bbl").unwrap();
//! assert!(common.contains(&Value::Int64(1)));
//! assert_eq!(common.len(), 1);
//! ```
//!
//! Values are compared with [`key::KeyPart`] normalization, so an integral float matches the
//! equal integer and `Null` matches `Null`.

pub mod exact;
pub mod key;
pub mod membership;
pub mod outer;

use std::fmt;

use serde::Serialize;

pub use exact::{diff_exact, diff_exact_shared, DiffRow, DifferingRows};
pub use membership::{highlight_mask, key_membership, KeySet};
pub use outer::{diff_outer, Provenance, TaggedRow, TaggedRows, DEFAULT_INDICATOR_COLUMN};

/// Which input a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The first dataset (`A`).
    Left,
    /// The second dataset (`B`).
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}
