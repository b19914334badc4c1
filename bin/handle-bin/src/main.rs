mod cli;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;
use url::Url;

use handle_db::{PgVaultStore, init_pool, run_migrations};
use handle_evm::{EvmVaultSource, TreasuryFeed, connect};
use handle_indexer::{IndexerConfig, IndexerService};
use handle_metrics::{MetricsRegistry, init_telemetry};
use handle_vaults::{Address, EventRouter, VaultUpdater};

use crate::cli::IndexerCli;

const APP_NAME: &str = "handle_vaults_indexer";

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let IndexerCli {
        database_url,
        database_max_connections,
        otel_collector_endpoint,
        rpc_url,
        treasury_address,
        start_block,
        block_batch_size,
        poll_interval_secs,
        confirmations,
    } = IndexerCli::parse();

    if block_batch_size == 0 {
        bail!("BLOCK_BATCH_SIZE must be at least 1");
    }

    let meter_provider = init_telemetry(APP_NAME, otel_collector_endpoint)
        .context("Could not init telemetry")?;

    let treasury: Address = treasury_address
        .parse()
        .context("Invalid treasury address")?;
    let rpc_url = Url::parse(&rpc_url).context("Invalid RPC URL")?;

    let pool = init_pool(&database_url, database_max_connections)?;
    run_migrations(&pool).await?;

    let provider = connect(rpc_url).context("Could not init the RPC provider")?;
    let source = Arc::new(EvmVaultSource::new(provider.clone()));
    let store = Arc::new(PgVaultStore::new(pool.clone()));
    let updater = Arc::new(VaultUpdater::new(source, store));
    let router = EventRouter::for_updater(updater);

    let metrics = MetricsRegistry::new();

    let config = IndexerConfig {
        start_block,
        block_batch_size,
        confirmations,
        poll_interval: Duration::from_secs(poll_interval_secs),
    };

    let indexer_service = IndexerService::new(
        pool,
        TreasuryFeed::new(provider, treasury),
        router,
        metrics.vaults.clone(),
        config,
    );

    let outcome = tokio::select! {
        result = indexer_service.run_forever() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("[handle_bin] 👋 Shutting down");
            Ok(())
        }
    };

    if let Some(Err(e)) = meter_provider.map(|provider| provider.shutdown()) {
        tracing::warn!("[handle_bin] ⚠️ Could not flush metrics: {e}");
    }

    outcome
}
