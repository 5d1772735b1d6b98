//! Named-field access used by search and sort.

use crate::model::{Activity, Contact, Deal};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

/// Borrowed view of one field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    TextList(&'a [String]),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    /// Enum values that search by label and sort by position.
    Ranked { label: &'static str, rank: usize },
    Flag(bool),
    Missing,
}

impl FieldValue<'_> {
    /// Case-insensitive substring test. Only textual values can match.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        match self {
            Self::Text(text) => text.to_lowercase().contains(needle),
            Self::TextList(items) => items.iter().any(|item| item.to_lowercase().contains(needle)),
            Self::Ranked { label, .. } => label.to_lowercase().contains(needle),
            _ => false,
        }
    }

    /// Natural ordering: text case-insensitively (raw text breaks ties),
    /// numbers numerically, timestamps and dates chronologically, ranked
    /// values by position. `Missing` sorts first.
    pub(crate) fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => compare_text(a, b),
            (Self::TextList(a), Self::TextList(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(left, right)| compare_text(left, right))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Ranked { rank: a, .. }, Self::Ranked { rank: b, .. }) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Records whose fields can be searched and sorted by name.
pub trait Queryable {
    type Field: Copy;

    fn field(&self, field: Self::Field) -> FieldValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Company,
    Tags,
    LastActivity,
    CreatedAt,
}

impl Queryable for Contact {
    type Field = ContactField;

    fn field(&self, field: ContactField) -> FieldValue<'_> {
        match field {
            ContactField::Name => FieldValue::Text(&self.name),
            ContactField::Email => FieldValue::Text(&self.email),
            ContactField::Phone => FieldValue::Text(&self.phone),
            ContactField::Company => FieldValue::Text(&self.company),
            ContactField::Tags => FieldValue::TextList(&self.tags),
            ContactField::LastActivity => FieldValue::Timestamp(self.last_activity),
            ContactField::CreatedAt => FieldValue::Timestamp(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealField {
    Title,
    Value,
    Stage,
    Probability,
    ExpectedClose,
    CreatedAt,
}

impl Queryable for Deal {
    type Field = DealField;

    fn field(&self, field: DealField) -> FieldValue<'_> {
        match field {
            DealField::Title => FieldValue::Text(&self.title),
            DealField::Value => FieldValue::Number(self.value),
            DealField::Stage => FieldValue::Ranked {
                label: self.stage.label(),
                rank: self.stage.index(),
            },
            DealField::Probability => FieldValue::Number(f64::from(self.probability)),
            DealField::ExpectedClose => self
                .expected_close
                .map_or(FieldValue::Missing, FieldValue::Date),
            DealField::CreatedAt => FieldValue::Timestamp(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityField {
    Type,
    Description,
    Timestamp,
    Completed,
}

impl Queryable for Activity {
    type Field = ActivityField;

    fn field(&self, field: ActivityField) -> FieldValue<'_> {
        match field {
            ActivityField::Type => FieldValue::Ranked {
                label: self.kind.as_str(),
                rank: self.kind as usize,
            },
            ActivityField::Description => FieldValue::Text(&self.description),
            ActivityField::Timestamp => FieldValue::Timestamp(self.timestamp),
            ActivityField::Completed => FieldValue::Flag(self.completed),
        }
    }
}
