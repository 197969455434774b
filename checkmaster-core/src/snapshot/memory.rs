//! In-memory implementation of `SnapshotSlot`.
//!
//! Values live in a `HashMap` behind a mutex and are lost when the slot is
//! dropped. An optional byte quota mimics a size-limited browser store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{check_quota, SnapshotError, SnapshotSlot};

#[derive(Default)]
pub struct InMemorySlot {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl InMemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot refusing any single value longer than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl SnapshotSlot for InMemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let values = self
            .values
            .lock()
            .map_err(|e| SnapshotError::storage("read", e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        check_quota(self.quota, value)?;
        let mut values = self
            .values
            .lock()
            .map_err(|e| SnapshotError::storage("write", e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
