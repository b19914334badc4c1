use std::sync::Arc;

use alloy_primitives::Address;

use crate::{
    error::UpdateError,
    events::{EventKind, VaultEvent},
    identity,
    record::VaultRecord,
    source::{self, BlockTag, ReadContext, VaultSource},
    store::{StoreError, VaultStore},
};

/// Derives vault records from treasury events.
///
/// Every event re-reads the full vault state from the source, so the order in
/// which debt and collateral events arrive does not change the final record
/// and replaying an event is harmless.
#[derive(Clone)]
pub struct VaultUpdater {
    source: Arc<dyn VaultSource>,
    store: Arc<dyn VaultStore>,
}

impl VaultUpdater {
    pub fn new(source: Arc<dyn VaultSource>, store: Arc<dyn VaultStore>) -> Self {
        Self { source, store }
    }

    pub async fn on_debt_changed(&self, event: &VaultEvent) -> Result<VaultRecord, UpdateError> {
        self.handle(event).await
    }

    pub async fn on_collateral_changed(
        &self,
        event: &VaultEvent,
    ) -> Result<VaultRecord, UpdateError> {
        self.handle(event).await
    }

    /// Loads the record for the pair, or builds a zeroed one. Nothing is written.
    pub async fn find_or_create(
        &self,
        account: Address,
        fx_token: Address,
    ) -> Result<VaultRecord, StoreError> {
        let id = identity::resolve(&account, &fx_token);
        match self.store.load(&id).await? {
            Some(record) => Ok(record),
            None => {
                tracing::debug!("[VaultUpdater] 🆕 No vault stored for {id}, creating one");
                Ok(VaultRecord::new(account, fx_token))
            }
        }
    }

    /// Reads the vault figures from the treasury, recomputes the record and
    /// persists it. If any read fails the record is not written.
    pub async fn refresh(
        &self,
        mut record: VaultRecord,
        treasury: ReadContext,
    ) -> Result<VaultRecord, UpdateError> {
        let snapshot =
            source::read_snapshot(self.source.as_ref(), treasury, record.account, record.fx_token)
                .await
                .inspect_err(|e| {
                    tracing::warn!(
                        vault_id = %record.id,
                        error = %e,
                        "[VaultUpdater] ⚠️ Source read failed, vault left untouched"
                    );
                })?;

        record.apply(snapshot);
        self.store.save(&record).await?;

        tracing::debug!(
            vault_id = %record.id,
            debt = %record.debt,
            collateral_as_ether = %record.collateral_as_ether,
            collateral_ratio = %record.collateral_ratio,
            minimum_ratio = %record.minimum_ratio,
            is_redeemable = record.is_redeemable,
            "[VaultUpdater] 💾 Vault refreshed"
        );

        Ok(record)
    }

    async fn handle(&self, event: &VaultEvent) -> Result<VaultRecord, UpdateError> {
        tracing::info!(
            "[VaultUpdater] 🔄 Handling {} for account {} / fxToken {} (block {})",
            event.kind,
            event.account,
            event.fx_token,
            event.context.block_number
        );

        let record = self.find_or_create(event.account, event.fx_token).await?;
        let treasury = ReadContext::new(
            event.context.contract_address,
            BlockTag::Number(event.context.block_number),
        );
        self.refresh(record, treasury).await
    }

    pub(crate) async fn dispatch(&self, event: &VaultEvent) -> Result<VaultRecord, UpdateError> {
        match event.kind {
            EventKind::DebtChanged => self.on_debt_changed(event).await,
            EventKind::CollateralChanged => self.on_collateral_changed(event).await,
        }
    }
}
