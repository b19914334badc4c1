pub mod telemetry;

use std::sync::Arc;

use opentelemetry::{KeyValue, global, metrics::Counter};

pub use telemetry::init_telemetry;

#[derive(Debug)]
pub struct MetricsRegistry {
    pub vaults: Arc<VaultMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            vaults: VaultMetrics::new(),
        })
    }
}

#[derive(Debug)]
pub struct VaultMetrics {
    events_processed: Counter<u64>,
    refresh_failures: Counter<u64>,
    flagged_redeemable: Counter<u64>,
}

impl VaultMetrics {
    fn new() -> Arc<Self> {
        let meter = global::meter("handle-vaults-indexer");
        let events_processed = meter
            .u64_counter("vault_events_processed_total")
            .with_description("Number of treasury events that refreshed a vault")
            .with_unit("count")
            .init();

        let refresh_failures = meter
            .u64_counter("vault_refresh_failures_total")
            .with_description("Number of treasury events whose vault refresh failed")
            .with_unit("count")
            .init();

        let flagged_redeemable = meter
            .u64_counter("vaults_flagged_redeemable_total")
            .with_description("Number of refreshes that left a vault redeemable")
            .with_unit("count")
            .init();

        Arc::new(Self {
            events_processed,
            refresh_failures,
            flagged_redeemable,
        })
    }

    pub fn record_event_processed(&self, treasury: &str, kind: &str, is_redeemable: bool) {
        let attributes = [
            KeyValue::new("treasury", treasury.to_string()),
            KeyValue::new("kind", kind.to_string()),
        ];
        self.events_processed.add(1, &attributes);
        if is_redeemable {
            self.flagged_redeemable.add(1, &attributes[..1]);
        }
    }

    pub fn record_refresh_failure(&self, treasury: &str, kind: &str) {
        self.refresh_failures.add(
            1,
            &[
                KeyValue::new("treasury", treasury.to_string()),
                KeyValue::new("kind", kind.to_string()),
            ],
        );
    }
}
