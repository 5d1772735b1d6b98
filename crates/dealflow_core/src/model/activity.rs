//! Activity domain model.
//!
//! # Invariants
//! - `description` is never blank.
//! - `completed` is monotonic: once `true` it stays `true`.
//! - `completed` only carries meaning for `ActivityType::Task`, but is kept
//!   for every type so one shape serves the whole feed.

use crate::model::{
    ensure_non_nil, ensure_not_blank, require_text, ContactId, DealId, EntityKind,
    ModelValidationError, Record,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for activities.
pub type ActivityId = Uuid;

/// Kind of logged interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    Task,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Call,
        ActivityType::Email,
        ActivityType::Meeting,
        ActivityType::Task,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "call" => Some(Self::Call),
            "email" => Some(Self::Email),
            "meeting" => Some(Self::Meeting),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logged call/email/meeting/task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    /// Serialized as `type` to match the feed schema.
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: String,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub deal_id: Option<DealId>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

/// Create input for activities. `kind` and `description` are required.
///
/// The timestamp is always assigned by the store at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: Option<ActivityType>,
    pub description: Option<String>,
    pub contact_id: Option<ContactId>,
    pub deal_id: Option<DealId>,
    /// Defaults to `false`.
    pub completed: Option<bool>,
}

impl NewActivity {
    pub fn new(kind: ActivityType, description: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Links the activity to a contact.
    pub fn for_contact(mut self, contact_id: ContactId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    /// Links the activity to a deal.
    pub fn for_deal(mut self, deal_id: DealId) -> Self {
        self.deal_id = Some(deal_id);
        self
    }
}

/// Shallow-merge patch for activities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub kind: Option<ActivityType>,
    pub description: Option<String>,
    pub contact_id: Option<Option<ContactId>>,
    pub deal_id: Option<Option<DealId>>,
    pub timestamp: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl ActivityPatch {
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }
}

impl Activity {
    /// Pending means an open task; other types are never pending.
    pub fn is_pending_task(&self) -> bool {
        self.kind == ActivityType::Task && !self.completed
    }
}

impl Record for Activity {
    type Draft = NewActivity;
    type Patch = ActivityPatch;

    const KIND: EntityKind = EntityKind::Activity;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(
        id: Uuid,
        draft: NewActivity,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        let kind = draft.kind.ok_or(ModelValidationError::MissingField("type"))?;
        let activity = Self {
            id,
            kind,
            description: require_text(draft.description, "description")?,
            contact_id: draft.contact_id,
            deal_id: draft.deal_id,
            timestamp: now,
            completed: draft.completed.unwrap_or(false),
        };
        activity.validate()?;
        Ok(activity)
    }

    fn merged(&self, patch: ActivityPatch) -> Result<Self, ModelValidationError> {
        if self.completed && patch.completed == Some(false) {
            return Err(ModelValidationError::CompletionReverted(self.id));
        }

        let mut next = self.clone();
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(contact_id) = patch.contact_id {
            next.contact_id = contact_id;
        }
        if let Some(deal_id) = patch.deal_id {
            next.deal_id = deal_id;
        }
        if let Some(timestamp) = patch.timestamp {
            next.timestamp = timestamp;
        }
        if let Some(completed) = patch.completed {
            next.completed = completed;
        }
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_non_nil(self.id)?;
        ensure_not_blank(&self.description, "description")
    }
}
