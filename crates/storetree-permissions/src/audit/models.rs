//! Audit log data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::Action;

/// Outcome recorded for an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDecision {
    /// A grant on the node or an ancestor allowed it
    Granted,
    /// No grant allowed it
    Denied,
    /// Allowed because the user is a local admin
    AdminOverride,
}

impl std::fmt::Display for AuditDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditDecision::Granted => write!(f, "granted"),
            AuditDecision::Denied => write!(f, "denied"),
            AuditDecision::AdminOverride => write!(f, "admin_override"),
        }
    }
}

/// Entry in the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Acting user, `owner/name`
    pub user: String,
    /// Key of the node being accessed
    pub resource: String,
    pub action: Action,
    pub decision: AuditDecision,
    /// Resource the deciding grant is attached to, when one matched
    pub matched_resource: Option<String>,
    /// Operation that triggered the check, e.g. "delete"
    pub operation: Option<String>,
}

impl AuditLogEntry {
    pub fn new(user: String, resource: String, action: Action, decision: AuditDecision) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user,
            resource,
            action,
            decision,
            matched_resource: None,
            operation: None,
        }
    }

    pub fn with_matched_resource(mut self, resource: String) -> Self {
        self.matched_resource = Some(resource);
        self
    }

    pub fn with_operation(mut self, operation: String) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn is_denial(&self) -> bool {
        self.decision == AuditDecision::Denied
    }
}
