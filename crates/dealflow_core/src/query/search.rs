//! Case-insensitive substring search over named fields.

use crate::query::fields::Queryable;

/// Returns records where any of `fields` contains `query`, ignoring case.
///
/// A blank or whitespace-only query returns every record without inspecting
/// any field. An empty `fields` list matches nothing for non-blank queries.
pub fn filter_by_search<T>(records: &[T], query: &str, fields: &[T::Field]) -> Vec<T>
where
    T: Queryable + Clone,
{
    if query.trim().is_empty() {
        return records.to_vec();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            fields
                .iter()
                .any(|field| record.field(*field).matches_lowercase(&needle))
        })
        .cloned()
        .collect()
}
