//! Field/direction sorting for table and feed views.

use crate::query::fields::Queryable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Active sort column of a table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortConfig<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Header-click behavior: the active field flips direction, any other
    /// field becomes active in ascending order.
    pub fn toggle(&mut self, field: F) {
        if self.field == field {
            self.direction = self.direction.reversed();
        } else {
            *self = Self::ascending(field);
        }
    }

    pub fn apply<T>(&self, records: Vec<T>) -> Vec<T>
    where
        T: Queryable<Field = F>,
    {
        sort_by(records, self.field, self.direction)
    }
}

/// Sorts a snapshot by `field` using its natural ordering.
///
/// The sort is stable in both directions: records comparing equal keep their
/// input order.
pub fn sort_by<T: Queryable>(
    mut records: Vec<T>,
    field: T::Field,
    direction: SortDirection,
) -> Vec<T> {
    records.sort_by(|a, b| {
        let ordering = a.field(field).natural_cmp(&b.field(field));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    records
}
