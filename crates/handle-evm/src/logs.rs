use std::ops::RangeInclusive;

use alloy::{
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
    sol_types::{SolEvent, TopicList},
    transports::TransportError,
};
use handle_vaults::{Address, EventContext, EventKind, VaultEvent};
use thiserror::Error;

use crate::contracts::ITreasury::{UpdateCollateral, UpdateDebt};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] TransportError),

    #[error("malformed log in tx {tx}: {message}")]
    Malformed { tx: String, message: String },
}

impl LogError {
    fn malformed(log: &Log, message: impl ToString) -> Self {
        Self::Malformed {
            tx: log
                .transaction_hash
                .map_or_else(|| "<pending>".to_string(), |hash| hash.to_string()),
            message: message.to_string(),
        }
    }
}

/// Next block range to fetch, or `None` when `next` is past `head`.
pub fn plan_range(next: u64, head: u64, batch_size: u64) -> Option<RangeInclusive<u64>> {
    if next > head {
        return None;
    }
    let span = batch_size.max(1) - 1;
    Some(next..=next.saturating_add(span).min(head))
}

/// Decodes one treasury event, refusing address topics with dirty high bytes.
fn decode_event<E: SolEvent>(log: &Log) -> Result<E, LogError> {
    let topics = log.topics();
    if topics.len() != E::TopicList::COUNT {
        return Err(LogError::malformed(
            log,
            format!(
                "{} log has {} topics, expected {}",
                E::SIGNATURE,
                topics.len(),
                E::TopicList::COUNT
            ),
        ));
    }
    if let Some(position) = topics
        .iter()
        .skip(1)
        .position(|topic| topic[..12].iter().any(|byte| *byte != 0))
    {
        return Err(LogError::malformed(
            log,
            format!("topic {} does not hold an address", position + 1),
        ));
    }

    E::decode_log(&log.inner)
        .map(|decoded| decoded.data)
        .map_err(|e| LogError::malformed(log, e))
}

/// Watches one treasury for `UpdateDebt` and `UpdateCollateral` logs.
#[derive(Debug, Clone)]
pub struct TreasuryLogs {
    treasury: Address,
}

impl TreasuryLogs {
    pub const fn new(treasury: Address) -> Self {
        Self { treasury }
    }

    pub const fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn filter(&self, range: &RangeInclusive<u64>) -> Filter {
        Filter::new()
            .address(self.treasury)
            .event_signature(vec![UpdateDebt::SIGNATURE_HASH, UpdateCollateral::SIGNATURE_HASH])
            .from_block(*range.start())
            .to_block(*range.end())
    }

    /// Decodes a log into a vault event. Logs with an unrelated topic yield `None`.
    pub fn decode(&self, log: &Log) -> Result<Option<VaultEvent>, LogError> {
        let Some(topic0) = log.topic0() else {
            return Ok(None);
        };

        let (kind, account, fx_token) = if *topic0 == UpdateDebt::SIGNATURE_HASH {
            let event = decode_event::<UpdateDebt>(log)?;
            (EventKind::DebtChanged, event.account, event.fxToken)
        } else if *topic0 == UpdateCollateral::SIGNATURE_HASH {
            let event = decode_event::<UpdateCollateral>(log)?;
            (EventKind::CollateralChanged, event.account, event.fxToken)
        } else {
            return Ok(None);
        };

        let block_number = log
            .block_number
            .ok_or_else(|| LogError::malformed(log, "missing block number"))?;
        let log_index = log
            .log_index
            .ok_or_else(|| LogError::malformed(log, "missing log index"))?;

        Ok(Some(VaultEvent {
            kind,
            account,
            fx_token,
            context: EventContext {
                contract_address: log.address(),
                block_number,
                log_index,
                transaction_hash: log.transaction_hash,
            },
        }))
    }

    /// Decodes a batch of logs into events in chain order, dropping removed logs.
    pub fn decode_all(&self, logs: &[Log]) -> Result<Vec<VaultEvent>, LogError> {
        let mut events = Vec::with_capacity(logs.len());
        for log in logs.iter().filter(|log| !log.removed) {
            if let Some(event) = self.decode(log)? {
                events.push(event);
            }
        }
        events.sort_by_key(|event| (event.context.block_number, event.context.log_index));
        Ok(events)
    }
}

/// Chain head and treasury events, read through one provider.
#[derive(Clone)]
pub struct TreasuryFeed {
    provider: RootProvider,
    logs: TreasuryLogs,
}

impl TreasuryFeed {
    pub const fn new(provider: RootProvider, treasury: Address) -> Self {
        Self {
            provider,
            logs: TreasuryLogs::new(treasury),
        }
    }

    pub const fn treasury(&self) -> Address {
        self.logs.treasury()
    }

    pub async fn head(&self) -> Result<u64, LogError> {
        Ok(self.provider.get_block_number().await?)
    }

    pub async fn events(&self, range: &RangeInclusive<u64>) -> Result<Vec<VaultEvent>, LogError> {
        let logs = self.provider.get_logs(&self.logs.filter(range)).await?;
        tracing::debug!(
            "[TreasuryFeed] Fetched {} logs for Treasury({}) in blocks {}..={}",
            logs.len(),
            self.logs.treasury(),
            range.start(),
            range.end()
        );
        self.logs.decode_all(&logs)
    }
}
