//! CRM domain model: contacts, deals and activities.
//!
//! # Responsibility
//! - Define canonical record shapes and their create/patch inputs.
//! - Own record-level validation so every write path shares one rule set.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil `Uuid`.
//! - Foreign keys (`contact_id`, `deal_id`) are never validated against other
//!   collections; dangling references are resolved by `crate::resolve`.

pub mod activity;
pub mod contact;
pub mod deal;

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use activity::{Activity, ActivityId, ActivityPatch, ActivityType, NewActivity};
pub use contact::{Contact, ContactId, ContactPatch, NewContact};
pub use deal::{Deal, DealId, DealPatch, NewDeal, Stage};

/// Shared contract for records held by an entity store.
///
/// Stores are generic over this trait so the three collections share one
/// CRUD implementation while keeping type-specific defaults and validation.
pub trait Record: Clone + Send + Sync + 'static {
    /// Create input. Required fields are optional here so absence is a
    /// validation failure rather than a type error at the call site.
    type Draft: Send;
    /// Shallow-merge input: only `Some(..)` fields overwrite.
    type Patch: Send;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Builds a new record with type-specific defaults filled in.
    fn from_draft(
        id: Uuid,
        draft: Self::Draft,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError>;

    /// Returns a copy of `self` with `patch` merged in and validated.
    ///
    /// `self` is left untouched, so a rejected patch never leaks into storage.
    fn merged(&self, patch: Self::Patch) -> Result<Self, ModelValidationError>;

    fn validate(&self) -> Result<(), ModelValidationError>;
}

/// Entity collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contact,
    Deal,
    Activity,
}

impl EntityKind {
    /// Stable lowercase name used in log lines and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Deal => "deal",
            Self::Activity => "activity",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record-level validation failures shared by all entity kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Record id must not be the nil UUID.
    NilId,
    /// A required field was absent or blank.
    MissingField(&'static str),
    /// Deal value must be a finite, non-negative number.
    InvalidValue(f64),
    /// Deal probability must be within 0..=100.
    InvalidProbability(u8),
    /// Contact email does not look like `local@domain`.
    InvalidEmail(String),
    /// A completed activity cannot be reopened.
    CompletionReverted(Uuid),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be nil"),
            Self::MissingField(field) => write!(f, "required field `{field}` is missing"),
            Self::InvalidValue(value) => {
                write!(f, "deal value must be finite and >= 0, got {value}")
            }
            Self::InvalidProbability(value) => {
                write!(f, "deal probability must be within 0..=100, got {value}")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::CompletionReverted(id) => {
                write!(f, "activity {id} is completed and cannot be reopened")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Returns the trimmed value of a required text field.
///
/// Blank input counts as missing, matching form semantics where an empty
/// string means "not provided".
pub(crate) fn require_text(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ModelValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(ModelValidationError::MissingField(field)),
    }
}

pub(crate) fn ensure_not_blank(
    value: &str,
    field: &'static str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn ensure_non_nil(id: Uuid) -> Result<(), ModelValidationError> {
    if id.is_nil() {
        return Err(ModelValidationError::NilId);
    }
    Ok(())
}
