//! Security module - capability checks and audit logging
//!
//! This module provides:
//! - The access gateway interface consulted before governance mutations
//! - An in-process role registry implementing it
//! - Audit observations and sinks

pub mod access;
pub mod audit;

pub use access::{AccessGateway, Capability, Principal, RoleError, RoleRegistry};
pub use audit::{AuditLogger, AuditRecord, AuditSink, MemoryAuditSink, Observation, TracingAuditSink};
