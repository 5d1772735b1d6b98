//! Composition root for the three entity services.
//!
//! # Responsibility
//! - Build contact, deal and activity services from one `CoreConfig`.
//! - Host use-cases that span collections (logging an activity, contact
//!   detail, dashboard, pipeline board).
//!
//! # Invariants
//! - Each collection keeps its own lock; cross-collection use-cases are not
//!   transactional and observe each store at its own point in time.
//! - Deleting a record never cascades into another collection.

use crate::config::CoreConfig;
use crate::dashboard::{dashboard_summary, DashboardSummary};
use crate::model::{Activity, Contact, ContactId, Deal, NewActivity};
use crate::pipeline::{
    partition_by_stage, pipeline_totals, PipelineEngine, PipelineTotals, StageBoard,
    TransitionPolicy,
};
use crate::repo::{InMemoryRepository, RepoResult};
use crate::seed::{load_seed, SeedData, SeedError};
use crate::service::entity_service::{ActivityService, ContactService, DealService};
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Contact with everything that references it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetail {
    pub contact: Contact,
    /// Most recent first.
    pub activities: Vec<Activity>,
    /// Storage order.
    pub deals: Vec<Deal>,
}

pub struct Crm {
    contacts: ContactService,
    deals: DealService,
    activities: ActivityService,
    policy: TransitionPolicy,
}

impl Crm {
    /// Empty stores wired per `config`.
    pub fn new(config: &CoreConfig) -> Self {
        let latency = config.latency_model();
        Self {
            contacts: ContactService::new(InMemoryRepository::new(), latency.clone()),
            deals: DealService::new(InMemoryRepository::new(), latency.clone()),
            activities: ActivityService::new(InMemoryRepository::new(), latency),
            policy: config.transition_policy(),
        }
    }

    /// Stores initialized from the bundled fixtures.
    pub fn from_seed(config: &CoreConfig) -> Result<Self, SeedError> {
        Self::from_seed_data(load_seed()?, config)
    }

    /// Stores initialized from `seed`, keeping its order.
    pub fn from_seed_data(seed: SeedData, config: &CoreConfig) -> Result<Self, SeedError> {
        let counts = (seed.contacts.len(), seed.deals.len(), seed.activities.len());
        let latency = config.latency_model();
        let crm = Self {
            contacts: ContactService::new(
                InMemoryRepository::with_records(seed.contacts)?,
                latency.clone(),
            ),
            deals: DealService::new(InMemoryRepository::with_records(seed.deals)?, latency.clone()),
            activities: ActivityService::new(
                InMemoryRepository::with_records(seed.activities)?,
                latency,
            ),
            policy: config.transition_policy(),
        };
        info!(
            "event=crm_seed module=service status=ok contacts={} deals={} activities={} latency={:?}",
            counts.0, counts.1, counts.2, config.latency
        );
        Ok(crm)
    }

    pub fn contacts(&self) -> &ContactService {
        &self.contacts
    }

    pub fn deals(&self) -> &DealService {
        &self.deals
    }

    pub fn activities(&self) -> &ActivityService {
        &self.activities
    }

    /// Stage-transition engine over this instance's deals.
    pub fn pipeline(&self) -> PipelineEngine<'_> {
        PipelineEngine::new(&self.deals, self.policy)
    }

    /// Creates an activity and advances the linked contact's `last_activity`.
    ///
    /// A dangling `contact_id` still creates the activity; only the contact
    /// touch is skipped.
    pub async fn log_activity(&self, draft: NewActivity) -> RepoResult<Activity> {
        let activity = self.activities.create(draft).await?;
        if let Some(contact_id) = activity.contact_id {
            let touched = self
                .contacts
                .touch_last_activity(contact_id, activity.timestamp)?;
            if touched.is_none() {
                warn!(
                    "event=log_activity module=service status=dangling_contact activity_id={} contact_id={}",
                    activity.id, contact_id
                );
            }
        }
        Ok(activity)
    }

    /// Contact plus its activities and deals, or `None` for an unknown id.
    pub async fn contact_detail(&self, id: ContactId) -> RepoResult<Option<ContactDetail>> {
        let Some(contact) = self.contacts.get_by_id(id).await? else {
            return Ok(None);
        };
        let (activities, deals) = futures::join!(
            self.activities.get_by_contact_id(id),
            self.deals.get_by_contact_id(id)
        );
        Ok(Some(ContactDetail {
            contact,
            activities: activities?,
            deals: deals?,
        }))
    }

    /// Dashboard metrics over fresh snapshots of all three collections.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> RepoResult<DashboardSummary> {
        let (contacts, deals, activities) = futures::join!(
            self.contacts.get_all(),
            self.deals.get_all(),
            self.activities.get_all()
        );
        Ok(dashboard_summary(&contacts?, &deals?, &activities?, now))
    }

    /// Kanban board over a fresh deal snapshot.
    pub async fn board(&self) -> RepoResult<StageBoard> {
        Ok(partition_by_stage(&self.deals.get_all().await?))
    }

    pub async fn totals(&self) -> RepoResult<PipelineTotals> {
        Ok(pipeline_totals(&self.deals.get_all().await?))
    }

    /// Tears the instance down and returns the stored records.
    pub fn into_snapshot(self) -> RepoResult<SeedData> {
        Ok(SeedData {
            contacts: self.contacts.into_repository()?.into_records(),
            deals: self.deals.into_repository()?.into_records(),
            activities: self.activities.into_repository()?.into_records(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Crm;
    use crate::config::CoreConfig;
    use crate::model::{ActivityType, NewActivity, NewContact};

    #[tokio::test]
    async fn log_activity_touches_linked_contact() {
        let crm = Crm::new(&CoreConfig::immediate());
        let contact = crm
            .contacts()
            .create(NewContact::new("Ann Lee", "ann@x.com"))
            .await
            .unwrap();

        let activity = crm
            .log_activity(NewActivity::new(ActivityType::Call, "intro").for_contact(contact.id))
            .await
            .unwrap();

        let reloaded = crm.contacts().get_by_id(contact.id).await.unwrap().unwrap();
        assert!(reloaded.last_activity >= contact.last_activity);
        assert_eq!(reloaded.last_activity, activity.timestamp.max(contact.last_activity));
    }

    #[tokio::test]
    async fn contact_detail_is_none_for_unknown_id() {
        let crm = Crm::new(&CoreConfig::immediate());
        let detail = crm.contact_detail(uuid::Uuid::new_v4()).await.unwrap();
        assert!(detail.is_none());
    }
}
