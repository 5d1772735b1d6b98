//! Core use-case services.
//!
//! # Responsibility
//! - Put every store call behind one async latency boundary.
//! - Compose per-entity services into cross-collection use-cases.

pub mod crm;
pub mod entity_service;
pub mod latency;

pub use crm::{ContactDetail, Crm};
pub use entity_service::{
    ActivityService, BulkDeleteReport, ContactService, DealService, EntityService,
};
pub use latency::{LatencyModel, NoLatency, Operation, SimulatedLatency, MAX_LATENCY_SCALE};
