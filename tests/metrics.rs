//! Prometheus exposition. Lives in its own test binary because the recorder
//! is process-global.

mod helpers;

use anyhow::Result;
use helpers::app::TestApp;
use reqwest::StatusCode;
use signal_relay::internal_metrics::install_prometheus;
use std::time::Duration;

#[tokio::test]
async fn webhook_counters_are_exposed() -> Result<()> {
    let handle = install_prometheus()?;
    let app = TestApp::spawn_with_metrics(true, Some(handle)).await?;

    app.post_webhook(Some("application/json"), r#"{"action":"PING"}"#)
        .await?;
    app.post_webhook(Some("text/plain"), "hello").await?;
    app.post_webhook(Some("application/json"), "").await?;

    let response = app.client.get(app.url("/metrics")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await?;

    assert!(body.contains(r#"webhooks_received_total{source="json"} 1"#), "{}", body);
    assert!(body.contains(r#"webhooks_received_total{source="raw_text"} 1"#), "{}", body);
    assert!(body.contains("webhooks_rejected_total 1"), "{}", body);

    let (_, health) = app.get_json("/").await?;
    assert_eq!(health["endpoints"].as_array().unwrap().len(), 6);
    assert_eq!(health["endpoints"][5], "/metrics");

    app.shutdown(Duration::from_secs(1)).await
}

#[tokio::test]
async fn metrics_route_is_absent_without_handle() -> Result<()> {
    let app = TestApp::spawn(true).await?;

    let response = app.client.get(app.url("/metrics")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.shutdown(Duration::from_secs(1)).await
}
