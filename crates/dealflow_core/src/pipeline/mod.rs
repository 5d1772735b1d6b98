//! Deal pipeline: stage columns, aggregates and stage transitions.
//!
//! # Responsibility
//! - Partition deal snapshots into the six stage columns.
//! - Compute per-stage and whole-pipeline aggregates.
//! - Execute drag-and-drop stage moves through the deal store
//!   ([`engine::PipelineEngine`]).
//!
//! # Invariants
//! - Every input deal lands in exactly one column; column order follows the
//!   input snapshot.
//! - Aggregates over zero deals are zero, never NaN.

pub mod engine;

use crate::model::{Deal, Stage};
use serde::Serialize;

pub use engine::{PipelineEngine, PipelineError, TransitionOutcome, TransitionPolicy};

/// Count and summed value of the deals in one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAggregate {
    pub count: usize,
    pub total_value: f64,
}

impl StageAggregate {
    fn add(&mut self, deal: &Deal) {
        self.count += 1;
        self.total_value += deal.value;
    }
}

/// One Kanban column.
#[derive(Debug, Clone, PartialEq)]
pub struct StageColumn {
    pub stage: Stage,
    pub deals: Vec<Deal>,
}

impl StageColumn {
    pub fn aggregate(&self) -> StageAggregate {
        let mut aggregate = StageAggregate::default();
        for deal in &self.deals {
            aggregate.add(deal);
        }
        aggregate
    }
}

/// All six stage columns in pipeline order.
#[derive(Debug, Clone, PartialEq)]
pub struct StageBoard {
    columns: Vec<StageColumn>,
}

impl StageBoard {
    pub fn columns(&self) -> &[StageColumn] {
        &self.columns
    }

    pub fn column(&self, stage: Stage) -> &StageColumn {
        &self.columns[stage.index()]
    }

    /// Total number of deals across all columns.
    pub fn deal_count(&self) -> usize {
        self.columns.iter().map(|column| column.deals.len()).sum()
    }
}

/// Groups deals by stage, keeping input order within each column.
pub fn partition_by_stage(deals: &[Deal]) -> StageBoard {
    let mut columns: Vec<StageColumn> = Stage::ALL
        .into_iter()
        .map(|stage| StageColumn {
            stage,
            deals: Vec::new(),
        })
        .collect();
    for deal in deals {
        columns[deal.stage.index()].deals.push(deal.clone());
    }
    StageBoard { columns }
}

/// Count and total value of the deals currently in `stage`.
pub fn aggregate_stage(deals: &[Deal], stage: Stage) -> StageAggregate {
    let mut aggregate = StageAggregate::default();
    for deal in deals.iter().filter(|deal| deal.stage == stage) {
        aggregate.add(deal);
    }
    aggregate
}

/// Headline numbers for the deals page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTotals {
    /// Sum of `value` over every deal.
    pub total_value: f64,
    /// Deals not in a terminal stage.
    pub active_count: usize,
    /// Sum of `value` over Closed Won deals.
    pub won_value: f64,
    /// Whole percent of deals that are Closed Won.
    pub win_rate: u32,
}

pub fn pipeline_totals(deals: &[Deal]) -> PipelineTotals {
    let mut totals = PipelineTotals::default();
    let mut won_count = 0_usize;
    for deal in deals {
        totals.total_value += deal.value;
        if !deal.stage.is_terminal() {
            totals.active_count += 1;
        }
        if deal.stage == Stage::ClosedWon {
            won_count += 1;
            totals.won_value += deal.value;
        }
    }
    totals.win_rate = win_rate(won_count, deals.len());
    totals
}

fn win_rate(won: usize, total: usize) -> u32 {
    let percent = 100.0 * won as f64 / total.max(1) as f64;
    percent.round() as u32
}

#[cfg(test)]
mod tests {
    use super::{win_rate, StageAggregate};

    #[test]
    fn win_rate_rounds_half_up_and_handles_zero() {
        assert_eq!(win_rate(0, 0), 0);
        assert_eq!(win_rate(2, 3), 67);
        assert_eq!(win_rate(1, 8), 13);
        assert_eq!(win_rate(3, 3), 100);
    }

    #[test]
    fn default_aggregate_is_zero() {
        let aggregate = StageAggregate::default();
        assert_eq!(aggregate.count, 0);
        assert_eq!(aggregate.total_value, 0.0);
    }
}
