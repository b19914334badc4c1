use std::fmt;

use alloy_primitives::{Address, B256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DebtChanged,
    CollateralChanged,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DebtChanged => "debt_changed",
            Self::CollateralChanged => "collateral_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event was emitted on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Address of the emitting treasury.
    pub contract_address: Address,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_hash: Option<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEvent {
    pub kind: EventKind,
    pub account: Address,
    pub fx_token: Address,
    pub context: EventContext,
}

impl VaultEvent {
    pub const fn debt_changed(account: Address, fx_token: Address, context: EventContext) -> Self {
        Self {
            kind: EventKind::DebtChanged,
            account,
            fx_token,
            context,
        }
    }

    pub const fn collateral_changed(
        account: Address,
        fx_token: Address,
        context: EventContext,
    ) -> Self {
        Self {
            kind: EventKind::CollateralChanged,
            account,
            fx_token,
            context,
        }
    }
}
