use alloy_primitives::{Address, U256};

use crate::identity::{self, VaultId};

/// Authoritative vault figures read from the treasury at one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub debt: U256,
    pub collateral_as_ether: U256,
    pub collateral_ratio: U256,
    pub minimum_ratio: U256,
}

impl VaultSnapshot {
    /// A vault is redeemable when it sits strictly under its minimum ratio and
    /// still holds both collateral and debt.
    pub fn is_redeemable(&self) -> bool {
        self.collateral_ratio < self.minimum_ratio
            && !self.collateral_as_ether.is_zero()
            && !self.debt.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecord {
    pub id: VaultId,
    pub account: Address,
    pub fx_token: Address,
    pub debt: U256,
    pub collateral_as_ether: U256,
    pub collateral_ratio: U256,
    pub minimum_ratio: U256,
    pub is_redeemable: bool,
}

impl VaultRecord {
    /// Fresh record for a pair seen for the first time: zeroed figures, not redeemable.
    pub fn new(account: Address, fx_token: Address) -> Self {
        Self {
            id: identity::resolve(&account, &fx_token),
            account,
            fx_token,
            debt: U256::ZERO,
            collateral_as_ether: U256::ZERO,
            collateral_ratio: U256::ZERO,
            minimum_ratio: U256::ZERO,
            is_redeemable: false,
        }
    }

    /// Overwrites every figure with the snapshot and recomputes `is_redeemable`.
    pub fn apply(&mut self, snapshot: VaultSnapshot) {
        self.is_redeemable = snapshot.is_redeemable();
        let VaultSnapshot {
            debt,
            collateral_as_ether,
            collateral_ratio,
            minimum_ratio,
        } = snapshot;
        self.debt = debt;
        self.collateral_as_ether = collateral_as_ether;
        self.collateral_ratio = collateral_ratio;
        self.minimum_ratio = minimum_ratio;
    }

    pub const fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            debt: self.debt,
            collateral_as_ether: self.collateral_as_ether,
            collateral_ratio: self.collateral_ratio,
            minimum_ratio: self.minimum_ratio,
        }
    }
}
