use std::{ops::RangeInclusive, sync::Arc};

use handle_evm::plan_range;
use handle_metrics::VaultMetrics;
use handle_vaults::{Address, Dispatched, EventRouter};
use task_supervisor::{SupervisedTask, TaskError};

use crate::{config::IndexerConfig, feed::EventFeed, state::CheckpointStore};

/// What one polling step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Indexed(RangeInclusive<u64>),
    /// Nothing left to scan below this (confirmed) head.
    AtHead(u64),
}

#[derive(Clone)]
pub struct TreasuryIndexer {
    treasury: Address,
    feed: Arc<dyn EventFeed>,
    checkpoints: Arc<dyn CheckpointStore>,
    router: EventRouter,
    config: IndexerConfig,
    metrics: Arc<VaultMetrics>,
    next_block: u64,
    synced: bool,
}

impl SupervisedTask for TreasuryIndexer {
    async fn run(&mut self) -> Result<(), TaskError> {
        self.resume().await?;

        tracing::info!(
            "[TreasuryIndexer] 🔌 Indexing Treasury({}) from block {}",
            self.treasury,
            self.next_block
        );

        loop {
            if let Step::AtHead(_) = self.step().await? {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }
}

impl TreasuryIndexer {
    pub fn new(
        treasury: Address,
        feed: Arc<dyn EventFeed>,
        checkpoints: Arc<dyn CheckpointStore>,
        router: EventRouter,
        config: IndexerConfig,
        metrics: Arc<VaultMetrics>,
    ) -> Self {
        let next_block = config.start_block;
        Self {
            treasury,
            feed,
            checkpoints,
            router,
            config,
            metrics,
            next_block,
            synced: false,
        }
    }

    /// Reload the checkpoint. Called on every (re)start of the task.
    pub async fn resume(&mut self) -> anyhow::Result<()> {
        self.next_block = self.checkpoints.load(self.config.start_block).await?;
        self.synced = false;
        Ok(())
    }

    /// Index the next range below the confirmed head, or report that there is none.
    ///
    /// A range is checkpointed only once all of its events were dispatched. On
    /// the first failing event the error is recorded and returned, the later
    /// events of the range are not dispatched and the checkpoint stays put.
    pub async fn step(&mut self) -> anyhow::Result<Step> {
        let head = self
            .feed
            .head()
            .await?
            .saturating_sub(self.config.confirmations);

        let Some(range) = plan_range(self.next_block, head, self.config.block_batch_size) else {
            if !self.synced {
                self.checkpoints.mark_synced().await?;
                self.synced = true;
                tracing::info!(
                    "[TreasuryIndexer] 🥳 Treasury({}) reached the tip of the chain at block {head}!",
                    self.treasury
                );
            }
            return Ok(Step::AtHead(head));
        };

        if let Err(e) = self.index_range(&range).await {
            if let Err(record_failure) = self.checkpoints.record_error(e.to_string()).await {
                tracing::error!(
                    "[TreasuryIndexer] 🗃️ Could not record failure of Treasury({}): {record_failure:#}",
                    self.treasury
                );
            }
            return Err(e);
        }

        self.checkpoints.advance(*range.end()).await?;
        self.next_block = range.end() + 1;
        Ok(Step::Indexed(range))
    }

    /// Fetch the treasury events of `range` and route them one by one, in chain order.
    async fn index_range(&self, range: &RangeInclusive<u64>) -> anyhow::Result<()> {
        let events = self.feed.events(range).await?;
        if events.is_empty() {
            tracing::debug!(
                "[TreasuryIndexer] No vault events in blocks {}..={}",
                range.start(),
                range.end()
            );
            return Ok(());
        }

        tracing::info!(
            "[TreasuryIndexer] 📦 {} vault events in blocks {}..={}",
            events.len(),
            range.start(),
            range.end()
        );

        let treasury = self.treasury.to_string();
        for event in events {
            match self.router.dispatch(&event).await {
                Ok(Dispatched::Handled(vault)) => {
                    self.metrics.record_event_processed(
                        &treasury,
                        event.kind.as_str(),
                        vault.is_redeemable,
                    );
                    if vault.is_redeemable {
                        tracing::info!(
                            "[TreasuryIndexer] 🚨 Vault {} (account {}) is redeemable: ratio {} < minimum {}",
                            vault.id,
                            vault.account,
                            vault.collateral_ratio,
                            vault.minimum_ratio
                        );
                    }
                }
                Ok(Dispatched::Unrouted) => {}
                Err(e) => {
                    self.metrics
                        .record_refresh_failure(&treasury, event.kind.as_str());
                    anyhow::bail!(
                        "😱 Refresh failed for {} at block {} (tx {}): {e}",
                        event.kind,
                        event.context.block_number,
                        event
                            .context
                            .transaction_hash
                            .map_or_else(|| "unknown".to_string(), |hash| hash.to_string())
                    );
                }
            }
        }

        Ok(())
    }
}
