use std::time::Duration;

/// Configuration for the treasury indexer runtime behaviour.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// First block scanned when the treasury has no checkpoint yet.
    pub start_block: u64,
    /// Maximum number of blocks requested per `eth_getLogs` call.
    pub block_batch_size: u64,
    /// Blocks kept between the chain head and the indexed range.
    pub confirmations: u64,
    pub poll_interval: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            start_block: 0,
            block_batch_size: 2_000,
            confirmations: 0,
            poll_interval: Duration::from_secs(6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndexerConfig::default();
        assert_eq!(config.block_batch_size, 2_000);
        assert_eq!(config.confirmations, 0);
        assert_eq!(config.poll_interval, Duration::from_secs(6));
    }
}
