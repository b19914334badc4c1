use anyhow::Context;
use deadpool_diesel::postgres::Pool;
use handle_db::HandlePool;
use handle_db::models::{IndexerState, IndexerStatus};

/// Persists how far a treasury has been indexed.
#[async_trait::async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Next block to scan. A treasury seen for the first time starts at `start_block`.
    async fn load(&self, start_block: u64) -> anyhow::Result<u64>;

    /// Every block up to `last_processed_block` has been dispatched.
    async fn advance(&self, last_processed_block: u64) -> anyhow::Result<()>;

    async fn mark_synced(&self) -> anyhow::Result<()>;

    async fn record_error(&self, message: String) -> anyhow::Result<()>;
}

/// Checkpoint of one treasury, kept in the `indexer_state` table.
#[derive(Clone)]
pub struct PgCheckpointStore {
    treasury_address: String,
    db_pool: Pool,
}

fn to_db_block(block: u64) -> anyhow::Result<i64> {
    i64::try_from(block).context("[PgCheckpointStore] 🌯 Block number too large for i64")
}

impl PgCheckpointStore {
    pub const fn new(treasury_address: String, db_pool: Pool) -> Self {
        Self {
            treasury_address,
            db_pool,
        }
    }
}

#[async_trait::async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn load(&self, start_block: u64) -> anyhow::Result<u64> {
        let treasury_address = self.treasury_address.clone();
        // Stored as the block before the first one to scan
        let initial = to_db_block(start_block)? - 1;

        let state = self
            .db_pool
            .run(
                format!("load indexer state of {}", self.treasury_address),
                move |conn| IndexerState::find_or_create(&treasury_address, initial, conn),
            )
            .await
            .with_context(|| {
                format!("[PgCheckpointStore({})] 🗃️ Loading checkpoint failed", self.treasury_address)
            })?;

        let next_block = u64::try_from(state.last_processed_block + 1)
            .context("[PgCheckpointStore] Stored block number is negative")?;

        if state.is_error() {
            tracing::warn!(
                "[PgCheckpointStore({})] ⚠️ Previous run failed, retrying from block {next_block} (last error: {})",
                self.treasury_address,
                state.last_error.as_deref().unwrap_or("unknown error")
            );
        }

        Ok(next_block)
    }

    async fn advance(&self, last_processed_block: u64) -> anyhow::Result<()> {
        let treasury_address = self.treasury_address.clone();
        let last_processed_block = to_db_block(last_processed_block)?;

        self.db_pool
            .run(format!("checkpoint {}", self.treasury_address), move |conn| {
                IndexerState::checkpoint(&treasury_address, last_processed_block, conn)
            })
            .await
            .with_context(|| {
                format!("[PgCheckpointStore({})] 🗃️ Checkpoint failed", self.treasury_address)
            })?;

        Ok(())
    }

    async fn mark_synced(&self) -> anyhow::Result<()> {
        let treasury_address = self.treasury_address.clone();

        self.db_pool
            .run(format!("mark {} synced", self.treasury_address), move |conn| {
                IndexerState::set_status(&treasury_address, IndexerStatus::Synced, conn)
            })
            .await
            .with_context(|| {
                format!("[PgCheckpointStore({})] 🗃️ Setting synced status failed", self.treasury_address)
            })?;

        Ok(())
    }

    async fn record_error(&self, message: String) -> anyhow::Result<()> {
        let treasury_address = self.treasury_address.clone();

        self.db_pool
            .run(format!("record error of {}", self.treasury_address), move |conn| {
                IndexerState::record_error(&treasury_address, message, conn)
            })
            .await
            .with_context(|| {
                format!("[PgCheckpointStore({})] 🗃️ Error recording failed", self.treasury_address)
            })?;

        Ok(())
    }
}
