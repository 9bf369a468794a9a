//! Grant sources backed by memory or a JSON file

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::manager::GrantSource;
use crate::permission::PermissionGrant;

/// Grant source holding a replaceable list in memory
#[derive(Clone, Default)]
pub struct InMemoryGrantSource {
    grants: Arc<RwLock<Vec<PermissionGrant>>>,
}

impl InMemoryGrantSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grants(grants: Vec<PermissionGrant>) -> Self {
        Self {
            grants: Arc::new(RwLock::new(grants)),
        }
    }

    /// Swap the list returned by subsequent fetches
    pub fn replace(&self, grants: Vec<PermissionGrant>) -> Result<()> {
        let mut stored = self
            .grants
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write grants: {}", e)))?;
        *stored = grants;
        Ok(())
    }

    pub fn push(&self, grant: PermissionGrant) -> Result<()> {
        let mut stored = self
            .grants
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write grants: {}", e)))?;
        stored.push(grant);
        Ok(())
    }
}

#[async_trait]
impl GrantSource for InMemoryGrantSource {
    async fn fetch_grants(&self, organization: &str) -> Result<Vec<PermissionGrant>> {
        let stored = self
            .grants
            .read()
            .map_err(|e| Error::Internal(format!("Failed to read grants: {}", e)))?;
        Ok(stored
            .iter()
            .filter(|grant| grant.owner == organization)
            .cloned()
            .collect())
    }
}

/// Grant source reading a JSON array of grants from disk
///
/// A missing file reads as no grants. By default only grants owned by the
/// requested organization are returned.
pub struct FileGrantSource {
    path: PathBuf,
    scoped: bool,
}

impl FileGrantSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            scoped: true,
        }
    }

    /// Return every grant in the file regardless of owner
    pub fn unscoped<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            scoped: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write grants as pretty JSON, creating parent directories
    pub async fn save(&self, grants: &[PermissionGrant]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(grants)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl GrantSource for FileGrantSource {
    async fn fetch_grants(&self, organization: &str) -> Result<Vec<PermissionGrant>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Grant file missing, no grants");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let grants: Vec<PermissionGrant> = serde_json::from_str(&content)?;
        if !self.scoped {
            return Ok(grants);
        }

        Ok(grants
            .into_iter()
            .filter(|grant| grant.owner == organization)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{Action, UserId};

    fn grant(owner: &str, name: &str) -> PermissionGrant {
        PermissionGrant::new(owner, name, "files", "/", Action::Read)
            .with_user(&UserId::new(owner, "alice"))
    }

    #[tokio::test]
    async fn test_in_memory_filters_organization() {
        let source =
            InMemoryGrantSource::with_grants(vec![grant("org", "p1"), grant("other", "p2")]);
        let grants = source.fetch_grants("org").await.unwrap();

        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].name, "p1");
    }

    #[tokio::test]
    async fn test_in_memory_replace_and_push() {
        let source = InMemoryGrantSource::new();
        assert!(source.fetch_grants("org").await.unwrap().is_empty());

        source.push(grant("org", "p1")).unwrap();
        assert_eq!(source.fetch_grants("org").await.unwrap().len(), 1);

        source.replace(vec![grant("org", "p2"), grant("org", "p3")]).unwrap();
        assert_eq!(source.fetch_grants("org").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileGrantSource::new(dir.path().join("grants.json"));
        assert!(source.fetch_grants("org").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_source_save_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("grants.json");

        let source = FileGrantSource::new(&path);
        source.save(&[grant("org", "p1"), grant("other", "p2")]).await.unwrap();

        let scoped = source.fetch_grants("org").await.unwrap();
        assert_eq!(scoped.len(), 1);

        let unscoped = FileGrantSource::unscoped(&path).fetch_grants("org").await.unwrap();
        assert_eq!(unscoped.len(), 2);
    }

    #[tokio::test]
    async fn test_file_source_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileGrantSource::new(&path).fetch_grants("org").await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
