//! Dashboard and activity-page metrics over snapshots.
//!
//! Calendar-day comparisons use UTC dates; callers pass `now` so results are
//! deterministic.

use crate::model::{Activity, Contact, Deal, Stage};
use crate::service::entity_service::sort_newest_first;
use chrono::{DateTime, Duration, Utc};

/// Number of entries in the dashboard's recent-activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub total: usize,
    /// Same UTC calendar day as `now`.
    pub today: usize,
    /// Timestamp within the last seven days (inclusive).
    pub this_week: usize,
    /// Open tasks.
    pub pending: usize,
}

pub fn activity_stats(activities: &[Activity], now: DateTime<Utc>) -> ActivityStats {
    let today = now.date_naive();
    let week_start = now - Duration::days(7);
    let mut stats = ActivityStats {
        total: activities.len(),
        ..ActivityStats::default()
    };
    for activity in activities {
        if activity.timestamp.date_naive() == today {
            stats.today += 1;
        }
        if activity.timestamp >= week_start {
            stats.this_week += 1;
        }
        if activity.is_pending_task() {
            stats.pending += 1;
        }
    }
    stats
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_contacts: usize,
    /// Deals not in a terminal stage.
    pub active_deals: usize,
    /// Summed value of Closed Won deals.
    pub total_revenue: f64,
    pub activities_today: usize,
    /// Newest first, at most [`RECENT_ACTIVITY_LIMIT`].
    pub recent_activities: Vec<Activity>,
}

pub fn dashboard_summary(
    contacts: &[Contact],
    deals: &[Deal],
    activities: &[Activity],
    now: DateTime<Utc>,
) -> DashboardSummary {
    let mut recent = activities.to_vec();
    sort_newest_first(&mut recent);
    recent.truncate(RECENT_ACTIVITY_LIMIT);

    DashboardSummary {
        total_contacts: contacts.len(),
        active_deals: deals.iter().filter(|deal| !deal.stage.is_terminal()).count(),
        total_revenue: deals
            .iter()
            .filter(|deal| deal.stage == Stage::ClosedWon)
            .map(|deal| deal.value)
            .sum(),
        activities_today: activity_stats(activities, now).today,
        recent_activities: recent,
    }
}
