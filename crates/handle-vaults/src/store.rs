use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::{identity::VaultId, record::VaultRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vault store failed during '{operation}': {message}")]
    Backend { operation: String, message: String },

    #[error("stored vault {id} is corrupt: {message}")]
    Corrupt { id: String, message: String },
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

/// Keyed persistence for vault records. `save` is create-or-replace by id.
#[async_trait::async_trait]
pub trait VaultStore: Send + Sync {
    async fn load(&self, id: &VaultId) -> Result<Option<VaultRecord>, StoreError>;

    async fn save(&self, record: &VaultRecord) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryVaultStore {
    records: RwLock<HashMap<VaultId, VaultRecord>>,
}

impl MemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl VaultStore for MemoryVaultStore {
    async fn load(&self, id: &VaultId) -> Result<Option<VaultRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &VaultRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};

    use super::*;

    #[tokio::test]
    async fn test_memory_store_upserts_by_id() {
        let store = MemoryVaultStore::new();
        let mut record = VaultRecord::new(Address::repeat_byte(1), Address::repeat_byte(2));

        assert!(store.load(&record.id).await.unwrap().is_none());

        store.save(&record).await.unwrap();
        record.debt = U256::from(42u64);
        store.save(&record).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.load(&record.id).await.unwrap();
        assert_eq!(stored, Some(record));
    }
}
