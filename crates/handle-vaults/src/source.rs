use std::fmt;

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::record::VaultSnapshot;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable while calling {method} on {contract}: {message}")]
    Unavailable {
        method: &'static str,
        contract: Address,
        message: String,
    },

    #[error("call to {method} on {contract} reverted: {message}")]
    Reverted {
        method: &'static str,
        contract: Address,
        message: String,
    },

    #[error("could not decode {method} result from {contract}: {message}")]
    Decode {
        method: &'static str,
        contract: Address,
        message: String,
    },
}

/// Block at which a read is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A contract to read from and the block to read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadContext {
    pub contract: Address,
    pub block: BlockTag,
}

impl ReadContext {
    pub const fn new(contract: Address, block: BlockTag) -> Self {
        Self { contract, block }
    }

    pub const fn with_contract(self, contract: Address) -> Self {
        Self {
            contract,
            block: self.block,
        }
    }
}

/// Read access to the treasury and its vault library.
///
/// `vault_library`, `get_debt` and `get_total_collateral_balance_as_eth` are
/// answered by the treasury; the two ratio reads by the vault library.
#[async_trait::async_trait]
pub trait VaultSource: Send + Sync {
    async fn vault_library(&self, treasury: ReadContext) -> Result<Address, SourceError>;

    async fn get_debt(
        &self,
        treasury: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError>;

    async fn get_total_collateral_balance_as_eth(
        &self,
        treasury: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError>;

    async fn get_current_ratio(
        &self,
        library: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError>;

    async fn get_vault_minimum_ratio(
        &self,
        library: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError>;
}

/// Reads every figure of a vault. Fails on the first erroring call.
pub async fn read_snapshot<S>(
    source: &S,
    treasury: ReadContext,
    account: Address,
    fx_token: Address,
) -> Result<VaultSnapshot, SourceError>
where
    S: VaultSource + ?Sized,
{
    let library = treasury.with_contract(source.vault_library(treasury).await?);

    let debt = source.get_debt(treasury, account, fx_token).await?;
    let collateral_as_ether = source
        .get_total_collateral_balance_as_eth(treasury, account, fx_token)
        .await?;
    let collateral_ratio = source.get_current_ratio(library, account, fx_token).await?;
    let minimum_ratio = source
        .get_vault_minimum_ratio(library, account, fx_token)
        .await?;

    Ok(VaultSnapshot {
        debt,
        collateral_as_ether,
        collateral_ratio,
        minimum_ratio,
    })
}
