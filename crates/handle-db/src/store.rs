use chrono::Utc;
use deadpool_diesel::postgres::Pool;
use handle_vaults::{StoreError, VaultId, VaultRecord, VaultStore};

use crate::{
    models::{NewVault, Vault},
    pool::HandlePool,
};

/// `VaultStore` backed by the `vaults` table.
#[derive(Clone)]
pub struct PgVaultStore {
    pool: Pool,
}

impl PgVaultStore {
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VaultStore for PgVaultStore {
    async fn load(&self, id: &VaultId) -> Result<Option<VaultRecord>, StoreError> {
        let vault_id = id.as_str().to_string();
        let vault = self
            .pool
            .run(format!("load vault {id}"), move |conn| {
                Vault::find_by_id(&vault_id, conn)
            })
            .await?;

        vault.map(Vault::into_record).transpose()
    }

    async fn save(&self, record: &VaultRecord) -> Result<(), StoreError> {
        let new_vault = NewVault::from_record(record, Utc::now());
        self.pool
            .run(format!("upsert vault {}", record.id), move |conn| {
                Vault::upsert(&new_vault, conn)
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use handle_vaults::{Address, U256, VaultSnapshot, resolve};

    use super::*;
    use crate::{init_pool, run_migrations};

    async fn store() -> PgVaultStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = init_pool(&url, 2).unwrap();
        run_migrations(&pool).await.unwrap();
        PgVaultStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_save_overwrites_existing_vault() {
        let store = store().await;
        let mut record = VaultRecord::new(Address::repeat_byte(0xa1), Address::repeat_byte(0xb2));

        store.save(&record).await.unwrap();
        assert_eq!(store.load(&record.id).await.unwrap(), Some(record.clone()));

        record.apply(VaultSnapshot {
            debt: U256::MAX,
            collateral_as_ether: U256::from(7u64),
            collateral_ratio: U256::from(1u64),
            minimum_ratio: U256::from(2u64),
        });
        store.save(&record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert!(loaded.is_redeemable);
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_load_unknown_vault() {
        let store = store().await;
        let id = resolve(&Address::repeat_byte(0xa1), &Address::repeat_byte(0xc3));
        assert_eq!(store.load(&id).await.unwrap(), None);
    }
}
