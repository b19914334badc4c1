pub mod config;
pub mod feed;
pub mod state;
pub mod treasury;

use std::{sync::Arc, time::Duration};

use deadpool_diesel::postgres::Pool;
use handle_evm::TreasuryFeed;
use handle_metrics::VaultMetrics;
use handle_vaults::{EventRouter, to_db_hex};
use task_supervisor::SupervisorBuilder;

pub use config::IndexerConfig;
pub use feed::EventFeed;
pub use state::{CheckpointStore, PgCheckpointStore};

use crate::treasury::TreasuryIndexer;

pub struct IndexerService {
    db_pool: Pool,
    feed: TreasuryFeed,
    router: EventRouter,
    metrics: Arc<VaultMetrics>,
    config: IndexerConfig,
}

impl IndexerService {
    pub const fn new(
        db_pool: Pool,
        feed: TreasuryFeed,
        router: EventRouter,
        metrics: Arc<VaultMetrics>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            db_pool,
            feed,
            router,
            metrics,
            config,
        }
    }

    pub async fn run_forever(&self) -> anyhow::Result<()> {
        let treasury = self.feed.treasury();
        let task_name = format!("treasury-{treasury}");
        tracing::info!(
            "[IndexerService] Starting indexer for treasury {treasury} at block {}",
            self.config.start_block
        );

        let indexer = TreasuryIndexer::new(
            treasury,
            Arc::new(self.feed.clone()),
            Arc::new(PgCheckpointStore::new(
                to_db_hex(treasury.as_slice()),
                self.db_pool.clone(),
            )),
            self.router.clone(),
            self.config.clone(),
            self.metrics.clone(),
        );

        let supervisor_handle = SupervisorBuilder::default()
            .with_dead_tasks_threshold(Some(0.5)) // the only task dying stops the supervisor
            .with_base_restart_delay(Duration::from_millis(500))
            .with_max_restart_attempts(5)
            .with_task_being_stable_after(Duration::from_secs(120))
            .with_health_check_interval(Duration::from_secs(5))
            .with_task(&task_name, indexer)
            .build()
            .run();

        supervisor_handle.wait().await?;
        anyhow::bail!("Indexer Supervisor stopped! 😨");
    }
}
