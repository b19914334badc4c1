use std::time::Duration;

use alloy::{
    eips::BlockId,
    providers::RootProvider,
    rpc::client::RpcClient,
    transports::http::Http,
};
use handle_vaults::BlockTag;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP provider whose requests give up after 30 seconds.
pub fn connect(url: Url) -> reqwest::Result<RootProvider> {
    let http_client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let transport = Http::with_client(http_client, url);
    Ok(RootProvider::new(RpcClient::new(transport, false)))
}

pub fn block_id(block: BlockTag) -> BlockId {
    match block {
        BlockTag::Latest => BlockId::latest(),
        BlockTag::Number(n) => BlockId::number(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id() {
        assert_eq!(block_id(BlockTag::Latest), BlockId::latest());
        assert_eq!(block_id(BlockTag::Number(16)), BlockId::number(16));
    }
}
