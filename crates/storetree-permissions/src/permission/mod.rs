//! Grant model, indexing and resolution

pub mod access;
pub mod index;
pub mod models;
pub mod resolver;

pub use access::{AccessSummary, FileAccess, Session};
pub use index::PermissionIndex;
pub use models::{Action, GrantState, PermissionGrant, UserId};
pub use resolver::PermissionResolver;
