//! Hierarchical permission resolution
//!
//! A node is authorized when a grant attached to it, or to any folder above
//! it, is active, names the user and covers the requested action. The walk
//! stops at the first match.

use tracing::debug;

use crate::permission::index::PermissionIndex;
use crate::permission::models::{Action, PermissionGrant, UserId};
use crate::tree::{FileTree, NodeId};

/// Resolver over the grant index currently loaded
///
/// With no index (grants not fetched yet) every request is denied.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    index: Option<&'a PermissionIndex>,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(index: Option<&'a PermissionIndex>) -> Self {
        Self { index }
    }

    /// Whether an index has been loaded
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Check whether `user` may perform `action` on `node`
    pub fn resolve(&self, tree: &FileTree, node: NodeId, action: Action, user: &UserId) -> bool {
        self.matching_grant(tree, node, action, user).is_some()
    }

    /// Find the grant that decides the request, along with the node it is
    /// attached to
    pub fn matching_grant(
        &self,
        tree: &FileTree,
        node: NodeId,
        action: Action,
        user: &UserId,
    ) -> Option<(NodeId, &'a PermissionGrant)> {
        let Some(index) = self.index else {
            debug!(%action, "Permission index not loaded, denying");
            return None;
        };

        for id in tree.ancestors(node) {
            let key = tree.node(id).key.as_str();
            if let Some(grant) = index
                .grants_for(key)
                .iter()
                .find(|grant| grant.authorizes(key, action, user))
            {
                debug!(
                    resource = key,
                    %action,
                    %user,
                    grant = %grant.id(),
                    "Permission granted"
                );
                return Some((id, grant));
            }
        }

        None
    }
}
