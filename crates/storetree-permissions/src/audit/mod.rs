//! Audit trail of access decisions

pub mod logger;
pub mod models;

pub use logger::AuditLogger;
pub use models::{AuditDecision, AuditLogEntry};
