//! Per-session access predicates
//!
//! Presentation code asks these before offering view, download, upload,
//! delete or grant actions on a node.

use crate::permission::index::PermissionIndex;
use crate::permission::models::{Action, PermissionGrant, UserId};
use crate::permission::resolver::PermissionResolver;
use crate::tree::{FileTree, NodeId};

/// The acting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserId,
    /// Local admins pass every Admin check without consulting grants
    pub local_admin: bool,
}

impl Session {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            local_admin: false,
        }
    }

    pub fn local_admin(user: UserId) -> Self {
        Self {
            user,
            local_admin: true,
        }
    }
}

/// Read/write/admin flags for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessSummary {
    pub readable: bool,
    pub writable: bool,
    pub admin: bool,
}

impl AccessSummary {
    /// No access at all; the explorer greys such nodes out
    pub fn is_restricted(&self) -> bool {
        !self.readable && !self.writable && !self.admin
    }
}

impl std::fmt::Display for AccessSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.readable, 'R'),
            flag(self.writable, 'W'),
            flag(self.admin, 'A')
        )
    }
}

/// Access checks for one session over one tree
#[derive(Debug, Clone, Copy)]
pub struct FileAccess<'a> {
    index: Option<&'a PermissionIndex>,
    tree: &'a FileTree,
    session: &'a Session,
}

impl<'a> FileAccess<'a> {
    pub fn new(
        index: Option<&'a PermissionIndex>,
        tree: &'a FileTree,
        session: &'a Session,
    ) -> Self {
        Self {
            index,
            tree,
            session,
        }
    }

    pub fn tree(&self) -> &'a FileTree {
        self.tree
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    pub fn resolver(&self) -> PermissionResolver<'a> {
        PermissionResolver::new(self.index)
    }

    pub fn is_readable(&self, node: NodeId) -> bool {
        self.check(node, Action::Read)
    }

    pub fn is_writable(&self, node: NodeId) -> bool {
        self.check(node, Action::Write)
    }

    pub fn is_admin(&self, node: NodeId) -> bool {
        if self.session.local_admin {
            return true;
        }
        self.check(node, Action::Admin)
    }

    /// Dispatch to the predicate for `action`
    pub fn allows(&self, node: NodeId, action: Action) -> bool {
        match action {
            Action::Read => self.is_readable(node),
            Action::Write => self.is_writable(node),
            Action::Admin => self.is_admin(node),
        }
    }

    pub fn summary(&self, node: NodeId) -> AccessSummary {
        AccessSummary {
            readable: self.is_readable(node),
            writable: self.is_writable(node),
            admin: self.is_admin(node),
        }
    }

    /// Grants attached directly to `node` that may be shown next to it
    ///
    /// Users who can read the node see every grant on it. Everyone else only
    /// sees the grants that name them. A node not in this tree has none.
    pub fn visible_grants(&self, node: NodeId) -> Vec<&'a PermissionGrant> {
        let (Some(index), Some(file)) = (self.index, self.tree.get(node)) else {
            return Vec::new();
        };

        let grants = index.grants_for(&file.key);
        if self.is_readable(node) {
            grants.iter().collect()
        } else {
            grants
                .iter()
                .filter(|grant| grant.includes_user(&self.session.user))
                .collect()
        }
    }

    fn check(&self, node: NodeId, action: Action) -> bool {
        self.resolver()
            .resolve(self.tree, node, action, &self.session.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileTreeEntry;

    fn tree() -> FileTree {
        FileTree::from_entry(
            FileTreeEntry::folder("/", "root")
                .with_child(FileTreeEntry::folder("/docs", "docs"))
                .with_child(FileTreeEntry::folder("/private", "private")),
        )
        .unwrap()
    }

    fn alice() -> UserId {
        UserId::new("org", "alice")
    }

    fn bob() -> UserId {
        UserId::new("org", "bob")
    }

    #[test]
    fn test_local_admin_override_only_affects_admin() {
        let tree = tree();
        let session = Session::local_admin(alice());
        let access = FileAccess::new(None, &tree, &session);
        let docs = tree.find("/docs").unwrap();

        assert!(access.is_admin(docs));
        assert!(!access.is_readable(docs));
        assert!(!access.is_writable(docs));
    }

    #[test]
    fn test_summary_and_restricted() {
        let tree = tree();
        let index = PermissionIndex::build(vec![PermissionGrant::new(
            "org", "p1", "store", "/docs", Action::Write,
        )
        .with_user(&alice())]);
        let session = Session::new(alice());
        let access = FileAccess::new(Some(&index), &tree, &session);

        let docs = access.summary(tree.find("/docs").unwrap());
        assert_eq!(
            docs,
            AccessSummary {
                readable: true,
                writable: true,
                admin: false
            }
        );
        assert_eq!(docs.to_string(), "RW-");

        let private = access.summary(tree.find("/private").unwrap());
        assert!(private.is_restricted());
        assert_eq!(private.to_string(), "---");
    }

    #[test]
    fn test_visible_grants_for_unreadable_node() {
        let tree = tree();
        let pending_alice = PermissionGrant::new("org", "ask", "store", "/private", Action::Read)
            .with_user(&alice())
            .with_state(crate::permission::models::GrantState::Pending);
        let approved_bob = PermissionGrant::new("org", "bob", "store", "/private", Action::Read)
            .with_user(&bob());
        let index = PermissionIndex::build(vec![pending_alice, approved_bob]);

        let private = tree.find("/private").unwrap();

        let alice_session = Session::new(alice());
        let access = FileAccess::new(Some(&index), &tree, &alice_session);
        let names: Vec<_> = access
            .visible_grants(private)
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["ask"]);

        let bob_session = Session::new(bob());
        let access = FileAccess::new(Some(&index), &tree, &bob_session);
        assert_eq!(access.visible_grants(private).len(), 2);
    }

    #[test]
    fn test_node_from_another_tree_is_denied_without_panicking() {
        let old = FileTree::from_entry(
            FileTreeEntry::folder("/", "root")
                .with_child(FileTreeEntry::folder("/a", "a"))
                .with_child(FileTreeEntry::folder("/b", "b")),
        )
        .unwrap();
        let refreshed = FileTree::from_entry(
            FileTreeEntry::folder("/", "root").with_child(FileTreeEntry::folder("/b", "b")),
        )
        .unwrap();
        let stale = old.find("/b").unwrap();

        let index = PermissionIndex::build(vec![PermissionGrant::new(
            "org", "p1", "store", "/b", Action::Admin,
        )
        .with_user(&alice())]);
        let session = Session::new(alice());
        let access = FileAccess::new(Some(&index), &refreshed, &session);

        assert!(access.summary(stale).is_restricted());
        assert!(access.visible_grants(stale).is_empty());
    }

    #[test]
    fn test_visible_grants_without_index() {
        let tree = tree();
        let session = Session::new(alice());
        let access = FileAccess::new(None, &tree, &session);
        assert!(access.visible_grants(tree.root()).is_empty());
    }
}
