//! Repository layer abstractions and in-memory implementation.
//!
//! # Responsibility
//! - Define the per-entity CRUD contract shared by contacts, deals and
//!   activities.
//! - Keep storage details (ordering, id generation) out of services.
//!
//! # Invariants
//! - Repository writes must pass `Record::validate()` before they land.
//! - Repository APIs return semantic errors (`NotFound`) instead of `None`
//!   for mutations against unknown ids.
//! - Every returned record is an owned copy; callers can never alias state.

pub mod memory_repo;

use crate::model::{EntityKind, ModelValidationError, Record};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use memory_repo::InMemoryRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity CRUD operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoError {
    Validation(ModelValidationError),
    NotFound { kind: EntityKind, id: Uuid },
    /// Seed data contained the same id twice.
    DuplicateId { kind: EntityKind, id: Uuid },
    /// A writer panicked while holding the store lock.
    LockPoisoned(&'static str),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id: {id}"),
            Self::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during `{operation}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::DuplicateId { .. } => None,
            Self::LockPoisoned(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for one entity collection.
///
/// Reads never fail for unknown ids; they return `None` or an empty list.
pub trait EntityRepository<T: Record>: Send {
    /// Snapshot of the whole collection in storage order.
    fn list(&self) -> Vec<T>;
    /// Snapshot of records matching `predicate`, in storage order.
    fn list_where(&self, predicate: &dyn Fn(&T) -> bool) -> Vec<T>;
    fn get(&self, id: Uuid) -> Option<T>;
    /// Creates a record stamped with `now` and returns a copy.
    fn create(&mut self, draft: T::Draft, now: DateTime<Utc>) -> RepoResult<T>;
    /// Shallow-merges `patch` and returns the merged copy.
    fn update(&mut self, id: Uuid, patch: T::Patch) -> RepoResult<T>;
    fn delete(&mut self, id: Uuid) -> RepoResult<()>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
