//! Enum-valued filters for the activity feed and deal lists.

use crate::model::{Activity, ActivityType, Deal, Stage};

/// Keeps activities of `kind`; `None` means "all".
pub fn filter_by_type(activities: &[Activity], kind: Option<ActivityType>) -> Vec<Activity> {
    match kind {
        None => activities.to_vec(),
        Some(kind) => activities
            .iter()
            .filter(|activity| activity.kind == kind)
            .cloned()
            .collect(),
    }
}

/// Keeps deals in `stage`; `None` means "all".
pub fn filter_by_stage(deals: &[Deal], stage: Option<Stage>) -> Vec<Deal> {
    match stage {
        None => deals.to_vec(),
        Some(stage) => deals
            .iter()
            .filter(|deal| deal.stage == stage)
            .cloned()
            .collect(),
    }
}
