//! Async entity service over one repository.
//!
//! # Responsibility
//! - Expose the store contract (`get_all`, `get_by_id`, `create`, `update`,
//!   `delete`) through the async latency boundary.
//! - Host entity-specific lookups (by contact, by deal, search, stage moves).
//!
//! # Invariants
//! - The repository lock is taken only after the latency await and is never
//!   held across a suspension point, so each call applies atomically.
//! - Failures are returned to the caller unchanged; nothing is retried.

use crate::model::{
    Activity, ActivityId, ActivityPatch, Contact, ContactId, ContactPatch, Deal, DealId,
    DealPatch, EntityKind, Record, Stage,
};
use crate::pipeline::TransitionPolicy;
use crate::query::{filter_by_search, ContactField};
use crate::repo::{EntityRepository, InMemoryRepository, RepoError, RepoResult};
use crate::service::latency::{LatencyModel, Operation};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Fields scanned by contact search.
const CONTACT_SEARCH_FIELDS: [ContactField; 4] = [
    ContactField::Name,
    ContactField::Email,
    ContactField::Company,
    ContactField::Phone,
];

/// Use-case service wrapper for one entity collection.
pub struct EntityService<T: Record, R: EntityRepository<T> = InMemoryRepository<T>> {
    repo: Mutex<R>,
    latency: Arc<dyn LatencyModel>,
    _record: PhantomData<fn() -> T>,
}

pub type ContactService = EntityService<Contact>;
pub type DealService = EntityService<Deal>;
pub type ActivityService = EntityService<Activity>;

/// Outcome of a best-effort bulk delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkDeleteReport {
    /// Ids removed, in request order.
    pub deleted: Vec<Uuid>,
    /// Ids that failed with their individual error.
    pub failed: Vec<(Uuid, RepoError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<T: Record, R: EntityRepository<T>> EntityService<T, R> {
    /// Creates a service that owns `repo`.
    pub fn new(repo: R, latency: Arc<dyn LatencyModel>) -> Self {
        Self {
            repo: Mutex::new(repo),
            latency,
            _record: PhantomData,
        }
    }

    /// Snapshot of the whole collection in storage order.
    pub async fn get_all(&self) -> RepoResult<Vec<T>> {
        self.latency.settle(Operation::GetAll).await;
        Ok(self.lock("get_all")?.list())
    }

    /// Returns one record, or `None` when the id is unknown.
    pub async fn get_by_id(&self, id: Uuid) -> RepoResult<Option<T>> {
        self.latency.settle(Operation::GetById).await;
        Ok(self.lock("get_by_id")?.get(id))
    }

    /// Creates a record stamped with the current time.
    pub async fn create(&self, draft: T::Draft) -> RepoResult<T> {
        self.latency.settle(Operation::Create).await;
        let result = self.lock("create")?.create(draft, Utc::now());
        log_outcome::<T>(Operation::Create, result.as_ref().map(|record| record.id()));
        result
    }

    /// Shallow-merges `patch` onto the record and returns the merged copy.
    pub async fn update(&self, id: Uuid, patch: T::Patch) -> RepoResult<T> {
        self.latency.settle(Operation::Update).await;
        self.apply_update(Operation::Update, id, patch)
    }

    /// Removes one record.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.latency.settle(Operation::Delete).await;
        let result = self.lock("delete")?.delete(id);
        log_outcome::<T>(Operation::Delete, result.as_ref().map(|_| id));
        result
    }

    /// Deletes every id independently; one failure never blocks the rest.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> BulkDeleteReport {
        let outcomes = join_all(ids.iter().map(|id| async move {
            let result = self.delete(*id).await;
            (*id, result)
        }))
        .await;

        let mut report = BulkDeleteReport::default();
        for (id, result) in outcomes {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(err) => report.failed.push((id, err)),
            }
        }

        if !report.is_complete() {
            warn!(
                "event=bulk_delete module=service status=partial kind={} requested={} failed={}",
                T::KIND,
                ids.len(),
                report.failed.len()
            );
        }
        report
    }

    /// Number of stored records. Does not wait on the latency model.
    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.lock("len")?.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Consumes the service and returns the repository it owned.
    pub fn into_repository(self) -> RepoResult<R> {
        self.repo
            .into_inner()
            .map_err(|_| RepoError::LockPoisoned("into_repository"))
    }

    pub(crate) fn lock(&self, operation: &'static str) -> RepoResult<MutexGuard<'_, R>> {
        self.repo
            .lock()
            .map_err(|_| RepoError::LockPoisoned(operation))
    }

    fn apply_update(&self, operation: Operation, id: Uuid, patch: T::Patch) -> RepoResult<T> {
        let result = self.lock(operation.as_str())?.update(id, patch);
        log_outcome::<T>(operation, result.as_ref().map(|_| id));
        result
    }

    async fn list_by_reference(
        &self,
        predicate: &(dyn Fn(&T) -> bool + Sync),
    ) -> RepoResult<Vec<T>> {
        self.latency.settle(Operation::GetByReference).await;
        Ok(self.lock("get_by_reference")?.list_where(predicate))
    }
}

impl<R: EntityRepository<Contact>> EntityService<Contact, R> {
    /// Case-insensitive search over name, email, company and phone.
    ///
    /// A blank query returns every contact.
    pub async fn search(&self, query: &str) -> RepoResult<Vec<Contact>> {
        self.latency.settle(Operation::Search).await;
        let contacts = self.lock("search")?.list();
        Ok(filter_by_search(&contacts, query, &CONTACT_SEARCH_FIELDS))
    }

    /// Advances a contact's `last_activity` to `at` if it is newer.
    ///
    /// Returns `None` when the contact no longer exists; a dangling reference
    /// is not an error here.
    pub(crate) fn touch_last_activity(
        &self,
        contact_id: ContactId,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Contact>> {
        let mut repo = self.lock("touch_last_activity")?;
        let Some(mut contact) = repo.get(contact_id) else {
            return Ok(None);
        };
        if !contact.record_activity(at) {
            return Ok(Some(contact));
        }
        let patch = ContactPatch {
            last_activity: Some(contact.last_activity),
            ..ContactPatch::default()
        };
        repo.update(contact_id, patch).map(Some)
    }
}

impl<R: EntityRepository<Deal>> EntityService<Deal, R> {
    /// Deals referencing `contact_id`, in storage order.
    pub async fn get_by_contact_id(&self, contact_id: ContactId) -> RepoResult<Vec<Deal>> {
        self.list_by_reference(&|deal: &Deal| deal.contact_id == Some(contact_id))
            .await
    }

    /// Moves a deal to `stage` without any pipeline policy checks.
    ///
    /// Use `PipelineEngine::request_transition` for drag-and-drop moves.
    pub async fn update_stage(&self, id: DealId, stage: Stage) -> RepoResult<Deal> {
        self.latency.settle(Operation::MoveStage).await;
        self.apply_update(Operation::MoveStage, id, DealPatch::stage(stage))
    }

    /// Moves a deal to `target` if `policy` permits leaving its stored stage.
    ///
    /// The policy check and the write happen under one lock acquisition, so
    /// the check always sees the stage the write replaces.
    pub(crate) async fn move_stage_checked(
        &self,
        id: DealId,
        target: Stage,
        policy: TransitionPolicy,
    ) -> RepoResult<StageMove> {
        self.latency.settle(Operation::MoveStage).await;
        let mut repo = self.lock(Operation::MoveStage.as_str())?;
        let stored = repo.get(id).ok_or(RepoError::NotFound {
            kind: EntityKind::Deal,
            id,
        })?;
        if stored.stage == target {
            return Ok(StageMove::Unchanged(stored));
        }
        if !policy.permits(stored.stage, target) {
            return Ok(StageMove::Blocked(stored));
        }
        let result = repo.update(id, DealPatch::stage(target));
        log_outcome::<Deal>(Operation::MoveStage, result.as_ref().map(|_| id));
        Ok(StageMove::Moved {
            deal: result?,
            from: stored.stage,
        })
    }
}

/// Result of a policy-checked stage move, judged against the stored deal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StageMove {
    /// The stored deal already sits in the target stage.
    Unchanged(Deal),
    /// The policy forbids leaving the stored stage; nothing was written.
    Blocked(Deal),
    Moved { deal: Deal, from: Stage },
}

impl<R: EntityRepository<Activity>> EntityService<Activity, R> {
    /// Activities for one contact, most recent first.
    pub async fn get_by_contact_id(&self, contact_id: ContactId) -> RepoResult<Vec<Activity>> {
        let mut activities = self
            .list_by_reference(&|activity: &Activity| activity.contact_id == Some(contact_id))
            .await?;
        sort_newest_first(&mut activities);
        Ok(activities)
    }

    /// Activities for one deal, most recent first.
    pub async fn get_by_deal_id(&self, deal_id: DealId) -> RepoResult<Vec<Activity>> {
        let mut activities = self
            .list_by_reference(&|activity: &Activity| activity.deal_id == Some(deal_id))
            .await?;
        sort_newest_first(&mut activities);
        Ok(activities)
    }

    /// Marks an activity as completed. Completing twice is a no-op.
    pub async fn mark_completed(&self, id: ActivityId) -> RepoResult<Activity> {
        self.latency.settle(Operation::MarkCompleted).await;
        self.apply_update(Operation::MarkCompleted, id, ActivityPatch::completed())
    }
}

/// Stable sort by timestamp, newest first.
pub(crate) fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn log_outcome<T: Record>(operation: Operation, outcome: Result<Uuid, &RepoError>) {
    match outcome {
        Ok(id) => debug!(
            "event=entity_{} module=service status=ok kind={} id={}",
            operation.as_str(),
            T::KIND,
            id
        ),
        Err(err) => warn!(
            "event=entity_{} module=service status=error kind={} error={}",
            operation.as_str(),
            T::KIND,
            error_label(err)
        ),
    }
}

/// Metadata-only error label; record contents never reach the log.
fn error_label(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::NotFound { .. } => "not_found",
        RepoError::DuplicateId { .. } => "duplicate_id",
        RepoError::LockPoisoned(_) => "lock_poisoned",
    }
}
