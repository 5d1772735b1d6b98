//! Foreign-key resolution with placeholder fallback.
//!
//! # Responsibility
//! - Turn `contact_id` / `deal_id` references into records for display.
//! - Build denormalized deal and activity views.
//!
//! # Invariants
//! - Resolution never fails: a missing or dangling reference yields a
//!   placeholder record ("Unknown Contact" / "Unknown Deal").
//! - Deleting a referenced record never cascades; references are left dangling
//!   and resolved here.

use crate::model::{Activity, Contact, ContactId, Deal, DealId, Record, Stage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use uuid::Uuid;

pub const UNKNOWN_CONTACT: &str = "Unknown Contact";
pub const UNKNOWN_DEAL: &str = "Unknown Deal";

/// Records that have a display stand-in for unresolved references.
pub trait Placeholder: Record {
    /// Placeholder carrying the id that failed to resolve (nil when the
    /// reference was absent).
    fn placeholder(id: Uuid) -> Self;
}

impl Placeholder for Contact {
    fn placeholder(id: Uuid) -> Self {
        Self {
            id,
            name: UNKNOWN_CONTACT.to_string(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
            tags: Vec::new(),
            last_activity: DateTime::<Utc>::UNIX_EPOCH,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Placeholder for Deal {
    fn placeholder(id: Uuid) -> Self {
        Self {
            id,
            title: UNKNOWN_DEAL.to_string(),
            value: 0.0,
            stage: Stage::Discovery,
            probability: 0,
            expected_close: None,
            contact_id: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Resolves `id` against `collection`, falling back to a placeholder.
///
/// A hit borrows from the snapshot; a miss is an owned placeholder.
pub fn resolve<T: Placeholder>(collection: &[T], id: Option<Uuid>) -> Cow<'_, T> {
    let found = id.and_then(|id| collection.iter().find(|record| record.id() == id));
    match found {
        Some(record) => Cow::Borrowed(record),
        None => Cow::Owned(T::placeholder(id.unwrap_or_else(Uuid::nil))),
    }
}

/// Display name for a contact reference.
pub fn contact_name(contacts: &[Contact], id: Option<ContactId>) -> &str {
    id.and_then(|id| contacts.iter().find(|contact| contact.id == id))
        .map_or(UNKNOWN_CONTACT, |contact| contact.name.as_str())
}

/// Display title for a deal reference.
pub fn deal_title(deals: &[Deal], id: Option<DealId>) -> &str {
    id.and_then(|id| deals.iter().find(|deal| deal.id == id))
        .map_or(UNKNOWN_DEAL, |deal| deal.title.as_str())
}

/// Deal card view with its contact resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealView<'a> {
    pub deal: &'a Deal,
    pub contact_name: &'a str,
}

/// Activity feed row with contact and deal resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView<'a> {
    pub activity: &'a Activity,
    pub contact_name: &'a str,
    /// `None` when the activity is not linked to a deal at all.
    pub deal_title: Option<&'a str>,
}

pub fn denormalize_deals<'a>(deals: &'a [Deal], contacts: &'a [Contact]) -> Vec<DealView<'a>> {
    deals
        .iter()
        .map(|deal| DealView {
            deal,
            contact_name: contact_name(contacts, deal.contact_id),
        })
        .collect()
}

pub fn denormalize_activities<'a>(
    activities: &'a [Activity],
    contacts: &'a [Contact],
    deals: &'a [Deal],
) -> Vec<ActivityView<'a>> {
    activities
        .iter()
        .map(|activity| ActivityView {
            activity,
            contact_name: contact_name(contacts, activity.contact_id),
            deal_title: activity.deal_id.map(|id| deal_title(deals, Some(id))),
        })
        .collect()
}
