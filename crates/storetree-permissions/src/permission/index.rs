//! Resource path index over grants

use std::collections::HashMap;

use tracing::debug;

use crate::permission::models::PermissionGrant;

/// Grants bucketed by their primary resource path
///
/// Built once per grant fetch and read-only afterwards. Within a bucket the
/// grants keep their original relative order.
#[derive(Debug, Clone, Default)]
pub struct PermissionIndex {
    buckets: HashMap<String, Vec<PermissionGrant>>,
    len: usize,
}

impl PermissionIndex {
    /// Index every grant under its first resource
    ///
    /// Grants with no resource at all have nothing to attach to and are
    /// skipped.
    pub fn build<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = PermissionGrant>,
    {
        let mut buckets: HashMap<String, Vec<PermissionGrant>> = HashMap::new();
        let mut len = 0;

        for grant in grants {
            let Some(resource) = grant.primary_resource().map(str::to_string) else {
                debug!(grant = %grant.id(), "Skipping grant without resource");
                continue;
            };
            buckets.entry(resource).or_default().push(grant);
            len += 1;
        }

        Self { buckets, len }
    }

    /// Keep the grants scoped to `store_name` that authorize at least one
    /// user, then index them
    pub fn from_fetched<I>(grants: I, store_name: &str) -> Self
    where
        I: IntoIterator<Item = PermissionGrant>,
    {
        let index = Self::build(grants.into_iter().filter(|grant| {
            grant.primary_domain() == Some(store_name) && !grant.users.is_empty()
        }));

        debug!(
            store = store_name,
            grants = index.len,
            resources = index.buckets.len(),
            "Built permission index"
        );
        index
    }

    /// Grants attached to a resource path, in fetch order
    pub fn grants_for(&self, key: &str) -> &[PermissionGrant] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }

    /// Total number of indexed grants
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct resource paths
    pub fn resource_count(&self) -> usize {
        self.buckets.len()
    }
}
