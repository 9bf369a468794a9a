//! Permission resolution for file-store trees
//!
//! Decides whether the current user may read, write or administer a file or
//! folder. Grants are indexed by resource path and looked up from the node
//! upward, so a grant on a folder covers everything beneath it.

pub mod audit;
pub mod config;
pub mod error;
pub mod explorer;
pub mod manager;
pub mod permission;
pub mod storage;
pub mod tree;

pub use audit::{AuditDecision, AuditLogEntry, AuditLogger};
pub use config::{PermissionConfig, StoreRef};
pub use error::{Error, Result};
pub use explorer::{Explorer, FileOperation, FileStore, PermissionRequest};
pub use manager::{GrantSource, PermissionManager};
pub use permission::{
    AccessSummary, Action, FileAccess, GrantState, PermissionGrant, PermissionIndex,
    PermissionResolver, Session, UserId,
};
pub use storage::{FileGrantSource, InMemoryGrantSource};
pub use tree::{FileNode, FileTree, FileTreeEntry, NodeId};
