//! Stage-transition engine over the deal store.
//!
//! # Invariants
//! - Dropping a deal on its own stage is a no-op: no store call is issued.
//! - With `lock_terminal_stages`, deals stored in Closed Won / Closed Lost
//!   cannot be moved; the store is not touched. The stored stage decides, so a
//!   stale snapshot cannot reopen a closed deal.
//! - The engine emits no notifications; surfacing a move is the caller's job.

use crate::model::{Deal, DealId, EntityKind, Stage};
use crate::repo::{EntityRepository, InMemoryRepository, RepoError};
use crate::service::entity_service::{EntityService, StageMove};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Transition rules applied by [`PipelineEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    /// Reject moves out of terminal stages. Off by default, which allows
    /// reopening a closed deal by dragging it to another column.
    pub lock_terminal_stages: bool,
}

impl TransitionPolicy {
    pub fn permits(&self, from: Stage, to: Stage) -> bool {
        from == to || !(self.lock_terminal_stages && from.is_terminal())
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Target equals the current stage; the store was not called.
    Unchanged(Deal),
    /// The store applied the move; `deal` is the authoritative record.
    Moved { deal: Deal, from: Stage },
}

impl TransitionOutcome {
    pub fn deal(&self) -> &Deal {
        match self {
            Self::Unchanged(deal) => deal,
            Self::Moved { deal, .. } => deal,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The deal sits in a terminal stage and the policy locks it.
    TerminalStage { deal_id: DealId, stage: Stage },
    Repo(RepoError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TerminalStage { deal_id, stage } => {
                write!(f, "deal {deal_id} is in terminal stage `{stage}` and cannot move")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::TerminalStage { .. } => None,
        }
    }
}

impl From<RepoError> for PipelineError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Executes stage moves against a borrowed deal service.
pub struct PipelineEngine<'a, R: EntityRepository<Deal> = InMemoryRepository<Deal>> {
    deals: &'a EntityService<Deal, R>,
    policy: TransitionPolicy,
}

impl<'a, R: EntityRepository<Deal>> PipelineEngine<'a, R> {
    pub fn new(deals: &'a EntityService<Deal, R>, policy: TransitionPolicy) -> Self {
        Self { deals, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Moves `deal` (the caller's snapshot) to `target`.
    ///
    /// A target equal to the snapshot's stage is a no-op. Otherwise the policy
    /// is checked against the stored deal, not the snapshot, in the same store
    /// step as the write.
    ///
    /// # Errors
    /// - `TerminalStage` when the policy locks the deal's stored stage.
    /// - `Repo(NotFound)` when the deal was deleted after the snapshot.
    pub async fn request_transition(
        &self,
        deal: &Deal,
        target: Stage,
    ) -> Result<TransitionOutcome, PipelineError> {
        if deal.stage == target {
            debug!(
                "event=stage_transition module=pipeline status=noop deal_id={} stage={}",
                deal.id,
                target.index()
            );
            return Ok(TransitionOutcome::Unchanged(deal.clone()));
        }

        match self
            .deals
            .move_stage_checked(deal.id, target, self.policy)
            .await?
        {
            StageMove::Unchanged(stored) => {
                debug!(
                    "event=stage_transition module=pipeline status=noop deal_id={} stage={}",
                    stored.id,
                    target.index()
                );
                Ok(TransitionOutcome::Unchanged(stored))
            }
            StageMove::Blocked(stored) => {
                debug!(
                    "event=stage_transition module=pipeline status=rejected deal_id={} from={} to={}",
                    stored.id,
                    stored.stage.index(),
                    target.index()
                );
                Err(PipelineError::TerminalStage {
                    deal_id: stored.id,
                    stage: stored.stage,
                })
            }
            StageMove::Moved { deal, from } => {
                debug!(
                    "event=stage_transition module=pipeline status=ok deal_id={} from={} to={}",
                    deal.id,
                    from.index(),
                    target.index()
                );
                Ok(TransitionOutcome::Moved { deal, from })
            }
        }
    }

    /// Loads the authoritative deal by id and moves it to `target`.
    pub async fn move_deal(
        &self,
        deal_id: DealId,
        target: Stage,
    ) -> Result<TransitionOutcome, PipelineError> {
        let deal = self
            .deals
            .get_by_id(deal_id)
            .await?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Deal,
                id: deal_id,
            })?;
        self.request_transition(&deal, target).await
    }
}
