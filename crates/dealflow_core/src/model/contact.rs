//! Contact domain model.
//!
//! # Responsibility
//! - Define the person/company record deals and activities point at.
//! - Normalize tags into an ordered, duplicate-free list.
//!
//! # Invariants
//! - `id` is stable and never reassigned by patches.
//! - `name` and `email` are never blank; `email` has a `local@domain` shape.
//! - `last_activity` only moves forward through [`Contact::record_activity`].

use crate::model::{
    ensure_non_nil, ensure_not_blank, require_text, EntityKind, ModelValidationError, Record,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for contacts.
pub type ContactId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

/// Person record owned by the contact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    /// Ordered set: first occurrence wins, blanks dropped.
    #[serde(default)]
    pub tags: Vec<String>,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Create input for contacts. `name` and `email` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub tags: Vec<String>,
}

impl NewContact {
    /// Shorthand for the two required fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

/// Shallow-merge patch for contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub tags: Option<Vec<String>>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Contact {
    /// Advances `last_activity` to `at` when `at` is newer.
    ///
    /// Returns whether the timestamp moved.
    pub fn record_activity(&mut self, at: DateTime<Utc>) -> bool {
        if at > self.last_activity {
            self.last_activity = at;
            return true;
        }
        false
    }
}

impl Record for Contact {
    type Draft = NewContact;
    type Patch = ContactPatch;

    const KIND: EntityKind = EntityKind::Contact;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(
        id: Uuid,
        draft: NewContact,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        let contact = Self {
            id,
            name: require_text(draft.name, "name")?,
            email: require_text(draft.email, "email")?,
            phone: draft.phone.unwrap_or_default(),
            company: draft.company.unwrap_or_default(),
            tags: normalize_tags(&draft.tags),
            last_activity: now,
            created_at: now,
        };
        contact.validate()?;
        Ok(contact)
    }

    fn merged(&self, patch: ContactPatch) -> Result<Self, ModelValidationError> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = email.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            next.phone = phone;
        }
        if let Some(company) = patch.company {
            next.company = company;
        }
        if let Some(tags) = patch.tags {
            next.tags = normalize_tags(&tags);
        }
        if let Some(last_activity) = patch.last_activity {
            next.last_activity = last_activity;
        }
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_non_nil(self.id)?;
        ensure_not_blank(&self.name, "name")?;
        ensure_not_blank(&self.email, "email")?;
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ModelValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// Trims tags, drops blanks and removes duplicates while keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || normalized.iter().any(|seen| seen == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, Contact, ContactPatch, NewContact};
    use crate::model::{ModelValidationError, Record};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn normalize_tags_keeps_first_occurrence_order() {
        let tags = vec![
            " vip ".to_string(),
            "enterprise".to_string(),
            "vip".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["vip", "enterprise"]);
    }

    #[test]
    fn from_draft_rejects_malformed_email() {
        let err = Contact::from_draft(
            Uuid::new_v4(),
            NewContact::new("Ann Lee", "not-an-email"),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelValidationError::InvalidEmail("not-an-email".to_string())
        );
    }

    #[test]
    fn record_activity_never_moves_backward() {
        let now = Utc::now();
        let mut contact =
            Contact::from_draft(Uuid::new_v4(), NewContact::new("Ann", "ann@acme.io"), now)
                .unwrap();

        assert!(!contact.record_activity(now - Duration::hours(1)));
        assert_eq!(contact.last_activity, now);
        assert!(contact.record_activity(now + Duration::hours(1)));
        assert_eq!(contact.last_activity, now + Duration::hours(1));
    }

    #[test]
    fn merged_rejects_blank_name_without_touching_original() {
        let contact = Contact::from_draft(
            Uuid::new_v4(),
            NewContact::new("Ann", "ann@acme.io"),
            Utc::now(),
        )
        .unwrap();
        let patch = ContactPatch {
            name: Some(" ".to_string()),
            ..ContactPatch::default()
        };

        assert_eq!(
            contact.merged(patch).unwrap_err(),
            ModelValidationError::MissingField("name")
        );
        assert_eq!(contact.name, "Ann");
    }

    #[test]
    fn merged_trims_text_like_from_draft() {
        let contact = Contact::from_draft(
            Uuid::new_v4(),
            NewContact::new(" Ann ", " ann@acme.io "),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(contact.email, "ann@acme.io");

        let patch = ContactPatch {
            name: Some("  Ann Lee ".to_string()),
            email: Some(" a@b.io ".to_string()),
            ..ContactPatch::default()
        };
        let merged = contact.merged(patch).unwrap();
        assert_eq!(merged.name, "Ann Lee");
        assert_eq!(merged.email, "a@b.io");
    }
}
