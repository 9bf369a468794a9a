//! In-memory audit logger

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::models::AuditLogEntry;
use crate::error::{Error, Result};

/// Entries kept by [`AuditLogger::new`]
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Records access decisions; clones share the same log
///
/// The log is bounded: once `capacity` entries are held, each new entry
/// evicts the oldest one.
#[derive(Clone)]
pub struct AuditLogger {
    entries: Arc<RwLock<VecDeque<AuditLogEntry>>>,
    capacity: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl AuditLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` entries; zero keeps none
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, entry: AuditLogEntry) -> Result<()> {
        debug!(
            user = %entry.user,
            resource = %entry.resource,
            action = %entry.action,
            decision = %entry.decision,
            "Access decision"
        );

        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::Internal(format!("Failed to acquire write lock: {}", e)))?;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> Result<Vec<AuditLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(entries.iter().cloned().collect())
    }

    pub fn denials(&self) -> Result<Vec<AuditLogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(AuditLogEntry::is_denial)
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::Internal(format!("Failed to acquire write lock: {}", e)))?;
        entries.clear();
        Ok(())
    }
}
