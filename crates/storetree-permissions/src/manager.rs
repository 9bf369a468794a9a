//! Grant loading and index lifecycle
//!
//! Grants are fetched from a [`GrantSource`] and indexed. A refresh replaces
//! the whole index at once; readers keep whatever snapshot they already
//! hold. Until the first fetch succeeds every access check is denied.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::PermissionConfig;
use crate::error::{Error, Result};
use crate::permission::{FileAccess, PermissionGrant, PermissionIndex, Session};
use crate::tree::FileTree;

/// Supplies the current grant list for an organization
#[async_trait]
pub trait GrantSource: Send + Sync {
    async fn fetch_grants(&self, organization: &str) -> Result<Vec<PermissionGrant>>;
}

/// Holds the grant index for one store
pub struct PermissionManager {
    config: PermissionConfig,
    source: Arc<dyn GrantSource>,
    index: RwLock<Option<Arc<PermissionIndex>>>,
    /// Held across fetch and swap so refreshes land in call order
    refresh_lock: Mutex<()>,
}

impl PermissionManager {
    pub fn new(config: PermissionConfig, source: Arc<dyn GrantSource>) -> Self {
        Self {
            config,
            source,
            index: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }

    /// Fetch grants and replace the index
    ///
    /// Returns the number of grants indexed. On failure the previous index
    /// stays in place. Concurrent calls run one after another, so a slow
    /// fetch never overwrites the result of a later one.
    pub async fn refresh(&self) -> Result<usize> {
        let _guard = self.refresh_lock.lock().await;

        let grants = match self.source.fetch_grants(&self.config.organization).await {
            Ok(grants) => grants,
            Err(e) => {
                warn!(
                    organization = %self.config.organization,
                    error = %e,
                    "Failed to fetch grants, keeping previous index"
                );
                return Err(e);
            }
        };

        let fetched = grants.len();
        let index = PermissionIndex::from_fetched(grants, &self.config.store.name);
        let indexed = index.len();

        let mut slot = self
            .index
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write index: {}", e)))?;
        *slot = Some(Arc::new(index));

        info!(
            store = %self.config.store_id(),
            fetched,
            indexed,
            "Permission index refreshed"
        );
        Ok(indexed)
    }

    /// Current index, `None` before the first successful refresh
    pub fn snapshot(&self) -> Option<Arc<PermissionIndex>> {
        match self.index.read() {
            Ok(slot) => slot.clone(),
            Err(e) => {
                debug!(error = %e, "Index lock poisoned, treating as not loaded");
                None
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Drop the index, returning to the deny-all state
    pub fn clear(&self) {
        if let Ok(mut slot) = self.index.write() {
            *slot = None;
        }
    }

    /// Access checks over a snapshot
    ///
    /// The snapshot is passed in so the borrow outlives this call:
    ///
    /// ```rust,ignore
    /// let snapshot = manager.snapshot();
    /// let access = PermissionManager::access(snapshot.as_deref(), &tree, &session);
    /// ```
    pub fn access<'a>(
        snapshot: Option<&'a PermissionIndex>,
        tree: &'a FileTree,
        session: &'a Session,
    ) -> FileAccess<'a> {
        FileAccess::new(snapshot, tree, session)
    }
}
