//! File tree arena
//!
//! The storage backend hands over a nested tree. It is flattened here into a
//! table of nodes where each node refers to its enclosing folder by index,
//! which is all permission inheritance needs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nested tree payload as delivered by the file store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeEntry {
    /// Unique path, also the resource key grants are matched against
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub is_leaf: bool,
    #[serde(default)]
    pub children: Vec<FileTreeEntry>,
}

impl FileTreeEntry {
    pub fn folder(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            size: 0,
            created_time: String::new(),
            is_leaf: false,
            children: Vec::new(),
        }
    }

    pub fn file(key: impl Into<String>, title: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            size,
            created_time: String::new(),
            is_leaf: true,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: FileTreeEntry) -> Self {
        self.children.push(child);
        self
    }
}

/// Index of a node inside a [`FileTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A file or folder in the arena
#[derive(Debug, Clone)]
pub struct FileNode {
    pub key: String,
    pub title: String,
    pub size: u64,
    pub created_time: String,
    pub is_leaf: bool,
    /// Enclosing folder, `None` at the root
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Flattened file tree with parent links
#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<FileNode>,
    by_key: HashMap<String, NodeId>,
}

impl FileTree {
    /// Flatten a nested tree, wiring parent links
    pub fn from_entry(root: FileTreeEntry) -> Result<Self> {
        let mut tree = Self {
            nodes: Vec::new(),
            by_key: HashMap::new(),
        };

        // (entry, parent) pairs, children pushed in reverse to keep pre-order
        let mut stack = vec![(root, None)];
        while let Some((entry, parent)) = stack.pop() {
            let id = NodeId(tree.nodes.len());
            if tree.by_key.insert(entry.key.clone(), id).is_some() {
                return Err(Error::DuplicateNode(entry.key));
            }

            if let Some(NodeId(p)) = parent {
                tree.nodes[p].children.push(id);
            }

            let FileTreeEntry {
                key,
                title,
                size,
                created_time,
                is_leaf,
                children,
            } = entry;

            tree.nodes.push(FileNode {
                key,
                title,
                size,
                created_time,
                is_leaf,
                parent,
                children: Vec::new(),
            });

            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        Ok(tree)
    }

    /// Parse a nested tree from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let entry: FileTreeEntry = serde_json::from_str(json)?;
        Self::from_entry(entry)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics if `id` was not handed out by this tree; use [`FileTree::get`]
    /// for ids that may come from an earlier tree.
    pub fn node(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.nodes.get(id.0)
    }

    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    /// Like [`FileTree::find`] but fails with [`Error::NodeNotFound`]
    pub fn require(&self, key: &str) -> Result<NodeId> {
        self.find(key).ok_or_else(|| Error::NodeNotFound(key.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// The node itself, then each enclosing folder up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map(|_| id),
        }
    }

    /// All nodes in pre-order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FileNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Depth below the root (root is 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Upward walk produced by [`FileTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a FileTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
