use std::sync::Mutex;

use alloy_primitives::{Address, U256};

use crate::{
    record::VaultSnapshot,
    source::{BlockTag, ReadContext, SourceError, VaultSource},
};

pub(crate) fn snapshot(debt: u64, collateral: u64, ratio: u64, minimum: u64) -> VaultSnapshot {
    VaultSnapshot {
        debt: U256::from(debt),
        collateral_as_ether: U256::from(collateral),
        collateral_ratio: U256::from(ratio),
        minimum_ratio: U256::from(minimum),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub(crate) method: &'static str,
    pub(crate) contract: Address,
    pub(crate) block: BlockTag,
}

/// Source double answering from a snapshot that tests can swap or poison.
pub(crate) struct ScriptedSource {
    snapshot: Mutex<VaultSnapshot>,
    failing: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSource {
    pub(crate) const LIBRARY: Address = Address::repeat_byte(0x11);

    pub(crate) const METHODS: [&'static str; 5] = [
        "vaultLibrary",
        "getDebt",
        "getTotalCollateralBalanceAsEth",
        "getCurrentRatio",
        "getVaultMinimumRatio",
    ];

    pub(crate) fn new(snapshot: VaultSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            failing: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_snapshot(&self, snapshot: VaultSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub(crate) fn fail_on(&self, method: &'static str) {
        *self.failing.lock().unwrap() = Some(method);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, context: ReadContext) -> Result<VaultSnapshot, SourceError> {
        self.calls.lock().unwrap().push(Call {
            method,
            contract: context.contract,
            block: context.block,
        });
        if *self.failing.lock().unwrap() == Some(method) {
            return Err(SourceError::Unavailable {
                method,
                contract: context.contract,
                message: "scripted failure".to_string(),
            });
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

#[async_trait::async_trait]
impl VaultSource for ScriptedSource {
    async fn vault_library(&self, treasury: ReadContext) -> Result<Address, SourceError> {
        self.record("vaultLibrary", treasury)?;
        Ok(Self::LIBRARY)
    }

    async fn get_debt(
        &self,
        treasury: ReadContext,
        _account: Address,
        _fx_token: Address,
    ) -> Result<U256, SourceError> {
        Ok(self.record("getDebt", treasury)?.debt)
    }

    async fn get_total_collateral_balance_as_eth(
        &self,
        treasury: ReadContext,
        _account: Address,
        _fx_token: Address,
    ) -> Result<U256, SourceError> {
        Ok(self
            .record("getTotalCollateralBalanceAsEth", treasury)?
            .collateral_as_ether)
    }

    async fn get_current_ratio(
        &self,
        library: ReadContext,
        _account: Address,
        _fx_token: Address,
    ) -> Result<U256, SourceError> {
        Ok(self.record("getCurrentRatio", library)?.collateral_ratio)
    }

    async fn get_vault_minimum_ratio(
        &self,
        library: ReadContext,
        _account: Address,
        _fx_token: Address,
    ) -> Result<U256, SourceError> {
        Ok(self.record("getVaultMinimumRatio", library)?.minimum_ratio)
    }
}
