use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Handle vaults indexer", long_about = None)]
pub struct IndexerCli {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value = "10")]
    pub database_max_connections: usize,

    /// OTEL collector endpoint
    #[arg(long, env = "OTEL_COLLECTOR_ENDPOINT")]
    pub otel_collector_endpoint: Option<String>,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Treasury contract to index (0x-prefixed hex)
    #[arg(long, env = "TREASURY_ADDRESS")]
    pub treasury_address: String,

    /// Starting block number for the indexer
    #[arg(long, env = "START_BLOCK")]
    pub start_block: u64,

    /// Maximum number of blocks per log request
    #[arg(long, env = "BLOCK_BATCH_SIZE", default_value = "2000")]
    pub block_batch_size: u64,

    /// Seconds to wait between polls once synced
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "6")]
    pub poll_interval_secs: u64,

    /// Blocks to stay behind the chain head
    #[arg(long, env = "CONFIRMATIONS", default_value = "0")]
    pub confirmations: u64,
}
