//! Stateless query helpers over collection snapshots.
//!
//! # Responsibility
//! - Filter snapshots by search text, activity type and deal stage.
//! - Sort snapshots by a named field and direction.
//! - Track bulk-action selections that tolerate stale ids.
//!
//! # Invariants
//! - Every function takes a snapshot and returns a new one; store state is
//!   never reachable from here.
//! - A blank search query returns the input unchanged.

pub mod fields;
pub mod filter;
pub mod search;
pub mod selection;
pub mod sort;

pub use fields::{ActivityField, ContactField, DealField, FieldValue, Queryable};
pub use filter::{filter_by_stage, filter_by_type};
pub use search::filter_by_search;
pub use selection::SelectionSet;
pub use sort::{sort_by, SortConfig, SortDirection};
