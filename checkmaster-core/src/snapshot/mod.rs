//! Local snapshot of the product list.
//!
//! The snapshot is a best-effort cache: one durable key-value slot holding the
//! whole list as JSON. The `SnapshotSlot` trait abstracts the key-value
//! backend; `SnapshotStore` implements the list operations on top of it.

mod memory;
mod sqlite;

pub use memory::InMemorySlot;
pub use sqlite::{SqliteSlot, SNAPSHOT_DB_FILE};

use thiserror::Error;
use tracing::{info, warn};

use crate::product::{Product, ProductId};

/// Slot the product list is stored under.
pub const SNAPSHOT_KEY: &str = "checkmaster_products";

/// Errors from the snapshot store and its backends.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The backend refused the write because it would exceed its capacity.
    #[error("snapshot quota exceeded: {needed} bytes do not fit")]
    QuotaExceeded { needed: usize },

    /// The stored value is not a valid product list.
    #[error("snapshot is corrupted: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("snapshot storage failed during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl SnapshotError {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }
}

/// Durable key-value backend for snapshots.
///
/// Operations are synchronous; a slot is expected to be fast and local.
pub trait SnapshotSlot: Send + Sync {
    /// Raw value stored under `key`, or `None` if the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>, SnapshotError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), SnapshotError>;
}

/// Reject a write larger than the slot's quota.
pub(crate) fn check_quota(quota: Option<usize>, value: &str) -> Result<(), SnapshotError> {
    match quota {
        Some(limit) if value.len() > limit => Err(SnapshotError::QuotaExceeded {
            needed: value.len(),
        }),
        _ => Ok(()),
    }
}

/// Product list persisted in a snapshot slot.
pub struct SnapshotStore {
    slot: Box<dyn SnapshotSlot>,
}

impl SnapshotStore {
    /// Wrap a slot, seeding it with an empty list if nothing is stored yet.
    pub fn new(slot: Box<dyn SnapshotSlot>) -> Result<Self, SnapshotError> {
        if slot.read(SNAPSHOT_KEY)?.is_none() {
            info!("Initializing empty product snapshot");
            slot.write(SNAPSHOT_KEY, "[]")?;
        }
        Ok(Self { slot })
    }

    /// All cached products. An unset slot reads as empty.
    pub fn list(&self) -> Result<Vec<Product>, SnapshotError> {
        match self.slot.read(SNAPSHOT_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// All cached products, resetting the slot to empty if it is corrupted.
    ///
    /// Backend failures read as empty without touching the slot.
    pub fn list_or_reset(&self) -> Vec<Product> {
        match self.list() {
            Ok(products) => products,
            Err(SnapshotError::Parse(e)) => {
                warn!("Discarding corrupted snapshot: {}", e);
                if let Err(e) = self.clear() {
                    warn!("Failed to reset corrupted snapshot: {}", e);
                }
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read snapshot: {}", e);
                Vec::new()
            }
        }
    }

    /// Cached list for an in-place edit. A corrupted slot is reset to empty
    /// and yields `None`, since nothing is left to edit.
    fn list_for_edit(&self) -> Result<Option<Vec<Product>>, SnapshotError> {
        match self.list() {
            Ok(products) => Ok(Some(products)),
            Err(SnapshotError::Parse(e)) => {
                warn!("Discarding corrupted snapshot: {}", e);
                self.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrite the cached list.
    pub fn save(&self, products: &[Product]) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string(products)
            .map_err(|e| SnapshotError::storage("serialize snapshot", e.to_string()))?;
        self.slot.write(SNAPSHOT_KEY, &raw)
    }

    /// Replace cached products with the same id. No-op if it isn't cached.
    pub fn update(&self, product: &Product) -> Result<(), SnapshotError> {
        let Some(mut products) = self.list_for_edit()? else {
            return Ok(());
        };
        let mut found = false;
        for existing in products.iter_mut().filter(|p| p.id == product.id) {
            *existing = product.clone();
            found = true;
        }
        if !found {
            return Ok(());
        }
        self.save(&products)
    }

    /// Remove the cached product with this id. No-op if it isn't cached.
    pub fn delete(&self, id: ProductId) -> Result<(), SnapshotError> {
        let Some(mut products) = self.list_for_edit()? else {
            return Ok(());
        };
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Ok(());
        }
        self.save(&products)
    }

    /// Reset the cached list to empty.
    pub fn clear(&self) -> Result<(), SnapshotError> {
        self.save(&[])
    }
}
