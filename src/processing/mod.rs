//! In-memory data transformations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion,
//! before or after reconciliation:
//!
//! - [`filter()`], [`map()`], [`reduce()`]: row-level primitives
//! - [`apply_filters`]: categorical and numeric-range column filters, combined with AND
//! - [`count_by`]: row counts per distinct value
//! - [`derive`]: `Yes`/`No` flag columns, prefix labels, null filling and dropping
//!
//! ## Example: tag priority networks and count them per borough
//!
//! ```rust
//! use parcel_recon::processing::{apply_filters, count_by, derive, ColumnFilter};
//! use parcel_recon::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("network", DataType::Utf8),
//!     Field::new("boro", DataType::Utf8),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("Ridgewood"), Value::from("QN")],
//!         vec![Value::from("Crown Heights"), Value::from("BK")],
//!         vec![Value::from("Astoria"), Value::from("QN")],
//!     ],
//! );
//!
//! let listed = [Value::from("Ridgewood"), Value::from("Crown Heights")];
//! let tagged = derive::flag_membership(&ds, "network", &listed, "dlm_priority").unwrap();
//! let priority = apply_filters(&tagged, &[("dlm_priority", ColumnFilter::OneOf(vec![Value::from("Yes")]))]).unwrap();
//!
//! let per_boro = count_by(&priority, "boro").unwrap();
//! assert_eq!(per_boro.rows[0], vec![Value::from("QN"), Value::Int64(1)]);
//! assert_eq!(per_boro.rows[1], vec![Value::from("BK"), Value::Int64(1)]);
//! ```

pub mod derive;
pub mod filter;
pub mod group;
pub mod map;
pub mod reduce;

pub use filter::{apply_filters, filter, ColumnFilter};
pub use group::{count_by, COUNT_COLUMN};
pub use map::map;
pub use reduce::{reduce, ReduceOp};
