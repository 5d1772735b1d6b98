//! Vec-backed entity repository.
//!
//! # Invariants
//! - Storage order is insertion order; updates keep a record in place and
//!   deletes close the gap.
//! - Ids are unique within one repository.

use crate::model::Record;
use crate::repo::{EntityRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashSet;
use uuid::Uuid;

/// Authoritative in-memory collection for one entity kind.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<T: Record> {
    records: Vec<T>,
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Builds a repository from seed records, keeping their order.
    ///
    /// Every record must validate and ids must be unique.
    pub fn with_records(records: Vec<T>) -> RepoResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.id()) {
                return Err(RepoError::DuplicateId {
                    kind: T::KIND,
                    id: record.id(),
                });
            }
        }
        debug!(
            "event=repo_seeded module=repo status=ok kind={} count={}",
            T::KIND,
            records.len()
        );
        Ok(Self { records })
    }

    /// Consumes the repository and returns the stored records.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn next_id(&self) -> Uuid {
        loop {
            let candidate = Uuid::new_v4();
            if self.position(candidate).is_none() {
                return candidate;
            }
        }
    }

    fn not_found(id: Uuid) -> RepoError {
        RepoError::NotFound { kind: T::KIND, id }
    }
}

impl<T: Record> EntityRepository<T> for InMemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        self.records.clone()
    }

    fn list_where(&self, predicate: &dyn Fn(&T) -> bool) -> Vec<T> {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.records.iter().find(|record| record.id() == id).cloned()
    }

    fn create(&mut self, draft: T::Draft, now: DateTime<Utc>) -> RepoResult<T> {
        let record = T::from_draft(self.next_id(), draft, now)?;
        self.records.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, id: Uuid, patch: T::Patch) -> RepoResult<T> {
        let index = self.position(id).ok_or_else(|| Self::not_found(id))?;
        let merged = self.records[index].merged(patch)?;
        self.records[index] = merged.clone();
        Ok(merged)
    }

    fn delete(&mut self, id: Uuid) -> RepoResult<()> {
        let index = self.position(id).ok_or_else(|| Self::not_found(id))?;
        self.records.remove(index);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
