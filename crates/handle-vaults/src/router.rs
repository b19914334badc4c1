use std::{collections::HashMap, sync::Arc};

use crate::{
    error::UpdateError,
    events::{EventKind, VaultEvent},
    record::VaultRecord,
    updater::VaultUpdater,
};

/// Outcome of routing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Handled(VaultRecord),
    Unrouted,
}

#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &VaultEvent) -> Result<VaultRecord, UpdateError>;
}

#[async_trait::async_trait]
impl EventHandler for VaultUpdater {
    async fn handle(&self, event: &VaultEvent) -> Result<VaultRecord, UpdateError> {
        self.dispatch(event).await
    }
}

/// Maps event kinds to their handlers. Owned by the hosting process.
#[derive(Default, Clone)]
pub struct EventRouter {
    routes: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router sending both treasury events to the updater.
    pub fn for_updater(updater: Arc<VaultUpdater>) -> Self {
        Self::new()
            .route(EventKind::DebtChanged, updater.clone())
            .route(EventKind::CollateralChanged, updater)
    }

    #[must_use]
    pub fn route(mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Self {
        self.routes.insert(kind, handler);
        self
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.routes.contains_key(&kind)
    }

    pub async fn dispatch(&self, event: &VaultEvent) -> Result<Dispatched, UpdateError> {
        match self.routes.get(&event.kind) {
            Some(handler) => handler.handle(event).await.map(Dispatched::Handled),
            None => {
                tracing::debug!("[EventRouter] ⏭️ No handler for {}, skipping", event.kind);
                Ok(Dispatched::Unrouted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256};

    use super::*;
    use crate::{
        events::EventContext,
        identity,
        store::{MemoryVaultStore, VaultStore},
        testing::{ScriptedSource, snapshot},
    };

    fn event(kind: EventKind) -> VaultEvent {
        VaultEvent {
            kind,
            account: Address::repeat_byte(3),
            fx_token: Address::repeat_byte(4),
            context: EventContext {
                contract_address: Address::repeat_byte(5),
                block_number: 9,
                log_index: 1,
                transaction_hash: Some(B256::repeat_byte(0xab)),
            },
        }
    }

    #[tokio::test]
    async fn test_router_sends_both_kinds_to_updater() {
        let store = Arc::new(MemoryVaultStore::new());
        let updater = Arc::new(VaultUpdater::new(
            Arc::new(ScriptedSource::new(snapshot(100, 10, 100, 150))),
            store.clone(),
        ));
        let router = EventRouter::for_updater(updater);

        for kind in [EventKind::DebtChanged, EventKind::CollateralChanged] {
            assert!(router.handles(kind));
            let Dispatched::Handled(record) = router.dispatch(&event(kind)).await.unwrap() else {
                panic!("{kind} was not routed");
            };
            assert!(record.is_redeemable);
        }

        let id = identity::resolve(&Address::repeat_byte(3), &Address::repeat_byte(4));
        assert!(store.load(&id).await.unwrap().is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unrouted_event_is_skipped() {
        let router = EventRouter::new();
        assert_eq!(
            router.dispatch(&event(EventKind::DebtChanged)).await.unwrap(),
            Dispatched::Unrouted
        );
    }
}
