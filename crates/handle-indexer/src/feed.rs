use std::ops::RangeInclusive;

use handle_evm::TreasuryFeed;
use handle_vaults::VaultEvent;

/// Where the indexer reads the chain head and the treasury events from.
#[async_trait::async_trait]
pub trait EventFeed: Send + Sync {
    async fn head(&self) -> anyhow::Result<u64>;

    /// Events emitted in `range`, in `(block, log index)` order.
    async fn events(&self, range: &RangeInclusive<u64>) -> anyhow::Result<Vec<VaultEvent>>;
}

#[async_trait::async_trait]
impl EventFeed for TreasuryFeed {
    async fn head(&self) -> anyhow::Result<u64> {
        Ok(Self::head(self).await?)
    }

    async fn events(&self, range: &RangeInclusive<u64>) -> anyhow::Result<Vec<VaultEvent>> {
        Ok(Self::events(self, range).await?)
    }
}
