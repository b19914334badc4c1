use std::time::Duration;

use opentelemetry::{KeyValue, global, metrics::MetricsError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, metrics::SdkMeterProvider, runtime};

const EXPORT_PERIOD: Duration = Duration::from_secs(10);

/// Install an OTLP meter provider as the global one.
///
/// Without an endpoint nothing is installed and the counters stay no-ops. Must
/// run before [`crate::MetricsRegistry::new`], since instruments bind to the
/// provider that is global when they are created.
pub fn init_telemetry(
    app_name: &str,
    otel_collector_endpoint: Option<String>,
) -> Result<Option<SdkMeterProvider>, MetricsError> {
    let Some(endpoint) = otel_collector_endpoint else {
        tracing::info!("[Telemetry] No OTEL collector endpoint, metrics are not exported");
        return Ok(None);
    };

    let provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.clone()),
        )
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            app_name.to_string(),
        )]))
        .with_period(EXPORT_PERIOD)
        .build()?;

    global::set_meter_provider(provider.clone());
    tracing::info!("[Telemetry] 📡 Exporting metrics to {endpoint}");

    Ok(Some(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_endpoint_installs_nothing() {
        assert!(init_telemetry("handle_vaults_indexer", None).unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_endpoint_installs_provider() {
        let provider = init_telemetry("handle_vaults_indexer", Some("http://localhost:4317".to_string()))
            .unwrap()
            .unwrap();
        crate::MetricsRegistry::new()
            .vaults
            .record_event_processed("0x55", "debt_changed", true);
        let _ = provider.shutdown();
    }
}
