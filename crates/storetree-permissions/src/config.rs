//! Explorer configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The file store a tree belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    pub owner: String,
    pub name: String,
}

impl StoreRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Store id used by the storage backend, `owner/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Where grants come from and which store they must be scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Organization whose grants are fetched
    pub organization: String,
    /// Grants whose first domain is not this store's name are ignored
    pub store: StoreRef,
}

impl PermissionConfig {
    pub fn new(organization: impl Into<String>, store: StoreRef) -> Self {
        Self {
            organization: organization.into(),
            store,
        }
    }

    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn store_id(&self) -> String {
        self.store.id()
    }
}
