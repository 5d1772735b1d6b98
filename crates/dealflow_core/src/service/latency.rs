//! Asynchronous boundary between callers and the in-memory stores.
//!
//! Every service call awaits a [`LatencyModel`] before it touches state. The
//! model stands in for a storage/network round-trip; swapping it never
//! changes store semantics.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Upper bound for the delay multiplier.
pub const MAX_LATENCY_SCALE: f64 = 100.0;

/// Store operation kinds, used to pick a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAll,
    GetById,
    /// Lookups by foreign key (`contact_id` / `deal_id`).
    GetByReference,
    Create,
    Update,
    Delete,
    MoveStage,
    MarkCompleted,
    Search,
}

impl Operation {
    /// Round-trip time the simulated backend charges for this operation.
    pub fn nominal_delay(self) -> Duration {
        let millis = match self {
            Self::GetAll => 300,
            Self::GetById => 200,
            Self::GetByReference => 250,
            Self::Create => 400,
            Self::Update => 300,
            Self::Delete => 250,
            Self::MoveStage => 200,
            Self::MarkCompleted => 200,
            Self::Search => 200,
        };
        Duration::from_millis(millis)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetAll => "get_all",
            Self::GetById => "get_by_id",
            Self::GetByReference => "get_by_reference",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::MoveStage => "move_stage",
            Self::MarkCompleted => "mark_completed",
            Self::Search => "search",
        }
    }
}

/// Suspension point awaited before each store operation.
#[async_trait]
pub trait LatencyModel: Send + Sync + Debug {
    async fn settle(&self, operation: Operation);
}

/// Resolves immediately. Used by tests and the CLI probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLatency;

#[async_trait]
impl LatencyModel for NoLatency {
    async fn settle(&self, _operation: Operation) {}
}

/// Sleeps on the tokio timer for each operation's nominal delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedLatency {
    scale: f64,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl SimulatedLatency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiplies every nominal delay by `scale`.
    ///
    /// Non-finite or negative factors fall back to `1.0`; factors above
    /// [`MAX_LATENCY_SCALE`] are clamped to it.
    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale >= 0.0 {
            scale.min(MAX_LATENCY_SCALE)
        } else {
            1.0
        };
        Self { scale }
    }

    pub fn delay_for(&self, operation: Operation) -> Duration {
        operation.nominal_delay().mul_f64(self.scale)
    }
}

#[async_trait]
impl LatencyModel for SimulatedLatency {
    async fn settle(&self, operation: Operation) {
        let delay = self.delay_for(operation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
