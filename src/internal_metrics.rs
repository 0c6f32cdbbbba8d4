//! # Internal Metrics Module
//!
//! Handlers and the notifier record through the `metrics` facade. Without an
//! installed recorder those calls are no-ops; when metrics are enabled a
//! Prometheus recorder is installed and rendered on `GET /metrics`.

use anyhow::Result;
use metrics::Unit;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Registers descriptions for every metric the relay records.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "webhooks_received_total",
        Unit::Count,
        "Webhook payloads accepted for relay, labeled by the parsing stage that produced them."
    );
    metrics::describe_counter!(
        "webhooks_rejected_total",
        Unit::Count,
        "Webhook requests rejected because the body carried no data."
    );
    metrics::describe_counter!(
        "notifications_sent_total",
        Unit::Count,
        "Outbound notification attempts, labeled by outcome."
    );
    metrics::describe_histogram!(
        "notification_duration_seconds",
        Unit::Seconds,
        "Latency of a single outbound notification call."
    );
}

/// Installs the global Prometheus recorder and returns a handle for rendering.
///
/// Fails if a global recorder has already been installed.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}
