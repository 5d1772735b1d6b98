//! Deal domain model and pipeline stages.
//!
//! # Responsibility
//! - Define the sales-opportunity record moved through the pipeline.
//! - Define the fixed, ordered stage set and which stages are terminal.
//!
//! # Invariants
//! - `value` is finite and `>= 0`.
//! - `probability` is within `0..=100`.
//! - `Stage` ordering (`Ord`) is pipeline order, Discovery first.

use crate::model::{
    ensure_non_nil, ensure_not_blank, require_text, ContactId, EntityKind, ModelValidationError,
    Record,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for deals.
pub type DealId = Uuid;

/// Pipeline stage. Declaration order is pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Discovery,
    Qualified,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 6] = [
        Stage::Discovery,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::ClosedWon,
        Stage::ClosedLost,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    /// Parses a display label, ignoring case and surrounding whitespace.
    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.label().eq_ignore_ascii_case(trimmed))
    }

    /// Zero-based position in the pipeline.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Closed Won and Closed Lost end a deal's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sales opportunity owned by the deal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub value: f64,
    pub stage: Stage,
    /// Win likelihood in percent.
    #[serde(default)]
    pub probability: u8,
    #[serde(default)]
    pub expected_close: Option<NaiveDate>,
    /// May point at a deleted or unknown contact.
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    pub created_at: DateTime<Utc>,
}

/// Create input for deals. `title` and `value` are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDeal {
    pub title: Option<String>,
    pub value: Option<f64>,
    /// Defaults to `Stage::Discovery`.
    pub stage: Option<Stage>,
    /// Defaults to `0`.
    pub probability: Option<u8>,
    pub expected_close: Option<NaiveDate>,
    pub contact_id: Option<ContactId>,
}

impl NewDeal {
    /// Shorthand for the two required fields.
    pub fn new(title: impl Into<String>, value: f64) -> Self {
        Self {
            title: Some(title.into()),
            value: Some(value),
            ..Self::default()
        }
    }
}

/// Shallow-merge patch for deals.
///
/// `contact_id: Some(None)` clears the reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealPatch {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<Stage>,
    pub probability: Option<u8>,
    pub expected_close: Option<Option<NaiveDate>>,
    pub contact_id: Option<Option<ContactId>>,
}

impl DealPatch {
    /// Patch that only moves the deal to `stage`.
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }
}

impl Record for Deal {
    type Draft = NewDeal;
    type Patch = DealPatch;

    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(
        id: Uuid,
        draft: NewDeal,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelValidationError> {
        let title = require_text(draft.title, "title")?;
        let value = draft.value.ok_or(ModelValidationError::MissingField("value"))?;
        let deal = Self {
            id,
            title,
            value,
            stage: draft.stage.unwrap_or(Stage::Discovery),
            probability: draft.probability.unwrap_or(0),
            expected_close: draft.expected_close,
            contact_id: draft.contact_id,
            created_at: now,
        };
        deal.validate()?;
        Ok(deal)
    }

    fn merged(&self, patch: DealPatch) -> Result<Self, ModelValidationError> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(value) = patch.value {
            next.value = value;
        }
        if let Some(stage) = patch.stage {
            next.stage = stage;
        }
        if let Some(probability) = patch.probability {
            next.probability = probability;
        }
        if let Some(expected_close) = patch.expected_close {
            next.expected_close = expected_close;
        }
        if let Some(contact_id) = patch.contact_id {
            next.contact_id = contact_id;
        }
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_non_nil(self.id)?;
        ensure_not_blank(&self.title, "title")?;
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(ModelValidationError::InvalidValue(self.value));
        }
        if self.probability > 100 {
            return Err(ModelValidationError::InvalidProbability(self.probability));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Deal, DealPatch, NewDeal, Stage};
    use crate::model::{ModelValidationError, Record};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn stage_order_matches_pipeline() {
        let mut shuffled = vec![Stage::ClosedLost, Stage::Discovery, Stage::Negotiation];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Stage::Discovery, Stage::Negotiation, Stage::ClosedLost]
        );
        assert_eq!(Stage::ClosedWon.index(), 4);
    }

    #[test]
    fn stage_labels_parse_back() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_label(stage.label()), Some(stage));
        }
        assert_eq!(Stage::from_label(" closed won "), Some(Stage::ClosedWon));
        assert_eq!(Stage::from_label("Won"), None);
    }

    #[test]
    fn from_draft_fills_defaults() {
        let deal =
            Deal::from_draft(Uuid::new_v4(), NewDeal::new("Renewal", 1200.0), Utc::now())
                .unwrap();
        assert_eq!(deal.stage, Stage::Discovery);
        assert_eq!(deal.probability, 0);
        assert_eq!(deal.contact_id, None);
    }

    #[test]
    fn validate_rejects_negative_value_and_probability_over_100() {
        let err = Deal::from_draft(Uuid::new_v4(), NewDeal::new("Bad", -1.0), Utc::now())
            .unwrap_err();
        assert_eq!(err, ModelValidationError::InvalidValue(-1.0));

        let draft = NewDeal {
            probability: Some(101),
            ..NewDeal::new("Bad", 10.0)
        };
        let err = Deal::from_draft(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert_eq!(err, ModelValidationError::InvalidProbability(101));
    }

    #[test]
    fn missing_value_is_reported_by_name() {
        let draft = NewDeal {
            title: Some("No value".to_string()),
            ..NewDeal::default()
        };
        let err = Deal::from_draft(Uuid::new_v4(), draft, Utc::now()).unwrap_err();
        assert_eq!(err, ModelValidationError::MissingField("value"));
    }

    #[test]
    fn merged_title_is_trimmed() {
        let deal = Deal::from_draft(Uuid::new_v4(), NewDeal::new(" Renewal ", 10.0), Utc::now())
            .unwrap();
        assert_eq!(deal.title, "Renewal");

        let patch = DealPatch {
            title: Some("  Renewal 2025  ".to_string()),
            ..DealPatch::default()
        };
        assert_eq!(deal.merged(patch).unwrap().title, "Renewal 2025");
    }
}
