//! Core domain logic for DealFlow, a small sales CRM.
//! This crate is the single source of truth for record invariants, pipeline
//! rules and query semantics; presentation layers only render its snapshots.

pub mod config;
pub mod dashboard;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod repo;
pub mod resolve;
pub mod seed;
pub mod service;

pub use config::{ConfigError, CoreConfig, LatencyProfile};
pub use dashboard::{activity_stats, dashboard_summary, ActivityStats, DashboardSummary};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    Activity, ActivityId, ActivityPatch, ActivityType, Contact, ContactId, ContactPatch, Deal,
    DealId, DealPatch, EntityKind, ModelValidationError, NewActivity, NewContact, NewDeal, Record,
    Stage,
};
pub use pipeline::{
    aggregate_stage, partition_by_stage, pipeline_totals, PipelineEngine, PipelineError,
    PipelineTotals, StageAggregate, StageBoard, StageColumn, TransitionOutcome, TransitionPolicy,
};
pub use repo::{EntityRepository, InMemoryRepository, RepoError, RepoResult};
pub use resolve::{resolve, ActivityView, DealView, UNKNOWN_CONTACT, UNKNOWN_DEAL};
pub use seed::{load_seed, SeedData, SeedError};
pub use service::{BulkDeleteReport, ContactDetail, Crm, EntityService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
