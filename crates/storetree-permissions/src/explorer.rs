//! Permission-gated file operations
//!
//! Every operation the explorer offers on a node is checked against the
//! grant index before it reaches the storage backend. Decisions are written
//! to the audit log.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{info, warn};

use crate::audit::{AuditDecision, AuditLogEntry, AuditLogger};
use crate::error::{Error, Result};
use crate::manager::PermissionManager;
use crate::permission::{Action, FileAccess, Session};
use crate::tree::{FileTree, NodeId};

/// Key of the store's root folder, which can never be deleted
pub const ROOT_KEY: &str = "/";

/// Operations the explorer offers on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOperation {
    /// Open in a viewer or list a folder
    Preview,
    /// Files only
    Download,
    /// Folders only
    Upload,
    /// Folders only
    CreateFolder,
    Delete,
    /// Grant access, or apply for it
    ManagePermissions,
}

impl FileOperation {
    /// Action level the operation needs
    pub fn required_action(&self) -> Action {
        match self {
            FileOperation::Preview | FileOperation::Download => Action::Read,
            FileOperation::Upload | FileOperation::CreateFolder | FileOperation::Delete => {
                Action::Write
            }
            FileOperation::ManagePermissions => Action::Admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileOperation::Preview => "preview",
            FileOperation::Download => "download",
            FileOperation::Upload => "upload",
            FileOperation::CreateFolder => "create folder in",
            FileOperation::Delete => "delete",
            FileOperation::ManagePermissions => "manage permissions of",
        }
    }
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the permission button on a node does for the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    /// User administers the node and may add grants directly
    Grant,
    /// User must apply for a grant
    Apply,
}

/// Remote storage backend
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Add a file (`is_leaf`) or folder under `parent_key`
    async fn add_file(
        &self,
        store_id: &str,
        parent_key: &str,
        is_leaf: bool,
        name: &str,
        content: Option<Vec<u8>>,
    ) -> Result<()>;

    async fn delete_file(&self, store_id: &str, key: &str, is_leaf: bool) -> Result<()>;
}

/// Gatekeeper between the tree view and the storage backend
pub struct Explorer {
    manager: Arc<PermissionManager>,
    store: Arc<dyn FileStore>,
    audit: AuditLogger,
}

impl Explorer {
    pub fn new(manager: Arc<PermissionManager>, store: Arc<dyn FileStore>) -> Self {
        Self {
            manager,
            store,
            audit: AuditLogger::new(),
        }
    }

    pub fn with_audit_logger(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    pub fn manager(&self) -> &Arc<PermissionManager> {
        &self.manager
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Check that `op` may be performed on `node`
    ///
    /// Shape errors (downloading a folder, deleting the root) come back as
    /// [`Error::InvalidOperation`]; missing access as
    /// [`Error::PermissionDenied`]; a node id from another tree as
    /// [`Error::NodeNotFound`]. Managing permissions is always allowed, see
    /// [`Explorer::permission_request`].
    pub fn authorize(
        &self,
        tree: &FileTree,
        session: &Session,
        node: NodeId,
        op: FileOperation,
    ) -> Result<()> {
        let file = tree
            .get(node)
            .ok_or_else(|| Error::NodeNotFound(format!("{:?}", node)))?;
        let invalid = |reason: &str| Error::InvalidOperation {
            key: file.key.clone(),
            operation: op.to_string(),
            reason: reason.to_string(),
        };

        match op {
            FileOperation::Download if !file.is_leaf => return Err(invalid("not a file")),
            FileOperation::Upload | FileOperation::CreateFolder if file.is_leaf => {
                return Err(invalid("not a folder"))
            }
            FileOperation::Delete if file.key == ROOT_KEY => {
                return Err(invalid("the root folder cannot be deleted"))
            }
            _ => {}
        }

        let decision = self.decide(tree, session, node, op)?;
        if op == FileOperation::ManagePermissions || decision != AuditDecision::Denied {
            return Ok(());
        }

        warn!(user = %session.user, resource = %file.key, operation = %op, "Operation denied");
        Err(Error::PermissionDenied {
            key: file.key.clone(),
            operation: op.to_string(),
        })
    }

    /// Whether the permission button grants directly or applies for access
    pub fn permission_request(
        &self,
        tree: &FileTree,
        session: &Session,
        node: NodeId,
    ) -> PermissionRequest {
        let snapshot = self.manager.snapshot();
        let access = FileAccess::new(snapshot.as_deref(), tree, session);
        if access.is_admin(node) {
            PermissionRequest::Grant
        } else {
            PermissionRequest::Apply
        }
    }

    /// Upload one file into `folder_key`
    pub async fn upload(
        &self,
        tree: &FileTree,
        session: &Session,
        folder_key: &str,
        name: &str,
        content: Vec<u8>,
    ) -> Result<()> {
        let folder = tree.require(folder_key)?;
        self.authorize(tree, session, folder, FileOperation::Upload)?;

        self.store
            .add_file(&self.store_id(), folder_key, true, name, Some(content))
            .await?;
        info!(folder = folder_key, name, "File uploaded");
        Ok(())
    }

    /// Upload several files into `folder_key` concurrently
    ///
    /// Authorization happens once up front. Fails with the first store error.
    pub async fn upload_all(
        &self,
        tree: &FileTree,
        session: &Session,
        folder_key: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<usize> {
        let folder = tree.require(folder_key)?;
        self.authorize(tree, session, folder, FileOperation::Upload)?;

        let store_id = self.store_id();
        let count = files.len();
        try_join_all(files.into_iter().map(|(name, content)| {
            let store = self.store.clone();
            let store_id = store_id.clone();
            async move {
                store
                    .add_file(&store_id, folder_key, true, &name, Some(content))
                    .await
            }
        }))
        .await?;

        info!(folder = folder_key, count, "Files uploaded");
        Ok(count)
    }

    /// Create a folder named `name` under `parent_key`
    pub async fn create_folder(
        &self,
        tree: &FileTree,
        session: &Session,
        parent_key: &str,
        name: &str,
    ) -> Result<()> {
        let parent = tree.require(parent_key)?;
        if name.trim().is_empty() {
            return Err(Error::InvalidOperation {
                key: parent_key.to_string(),
                operation: FileOperation::CreateFolder.to_string(),
                reason: "folder name is empty".to_string(),
            });
        }
        self.authorize(tree, session, parent, FileOperation::CreateFolder)?;

        self.store
            .add_file(&self.store_id(), parent_key, false, name, None)
            .await?;
        info!(parent = parent_key, name, "Folder created");
        Ok(())
    }

    /// Delete a file or folder
    pub async fn delete(&self, tree: &FileTree, session: &Session, key: &str) -> Result<()> {
        let node = tree.require(key)?;
        self.authorize(tree, session, node, FileOperation::Delete)?;

        let is_leaf = tree.node(node).is_leaf;
        self.store.delete_file(&self.store_id(), key, is_leaf).await?;
        info!(key, is_leaf, "File deleted");
        Ok(())
    }

    fn store_id(&self) -> String {
        self.manager.config().store_id()
    }

    fn decide(
        &self,
        tree: &FileTree,
        session: &Session,
        node: NodeId,
        op: FileOperation,
    ) -> Result<AuditDecision> {
        let action = op.required_action();
        let snapshot = self.manager.snapshot();
        let access = FileAccess::new(snapshot.as_deref(), tree, session);

        let mut entry = AuditLogEntry::new(
            session.user.to_string(),
            tree.node(node).key.clone(),
            action,
            AuditDecision::Denied,
        )
        .with_operation(op.as_str().to_string());

        if action == Action::Admin && session.local_admin {
            entry.decision = AuditDecision::AdminOverride;
        } else if let Some((at, _)) =
            access
                .resolver()
                .matching_grant(tree, node, action, &session.user)
        {
            entry.decision = AuditDecision::Granted;
            entry = entry.with_matched_resource(tree.node(at).key.clone());
        }

        let decision = entry.decision;
        self.audit.record(entry)?;
        Ok(decision)
    }
}
