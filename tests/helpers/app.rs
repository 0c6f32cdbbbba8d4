#![allow(dead_code)]
//! Test helpers for running the relay on a real socket.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::StatusCode;
use serde_json::Value;
use signal_relay::{
    app::App, config::Config, core::MessageFormatter,
    notification::test_utils::RecordingNotifier,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time::timeout};

/// Returns a configuration that binds an ephemeral port on loopback.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

/// A running relay backed by a [`RecordingNotifier`].
pub struct TestApp {
    pub addr: SocketAddr,
    pub notifier: RecordingNotifier,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    app_handle: JoinHandle<Result<()>>,
}

impl TestApp {
    /// Spawns the relay. `deliver` is the outcome the notifier reports.
    pub async fn spawn(deliver: bool) -> Result<Self> {
        Self::spawn_with_metrics(deliver, None).await
    }

    pub async fn spawn_with_metrics(
        deliver: bool,
        prometheus: Option<PrometheusHandle>,
    ) -> Result<Self> {
        Self::spawn_inner(deliver, prometheus, None).await
    }

    /// Spawns the relay with a custom message formatter.
    pub async fn spawn_with_formatter(
        deliver: bool,
        formatter: Arc<dyn MessageFormatter>,
    ) -> Result<Self> {
        Self::spawn_inner(deliver, None, Some(formatter)).await
    }

    async fn spawn_inner(
        deliver: bool,
        prometheus: Option<PrometheusHandle>,
        formatter: Option<Arc<dyn MessageFormatter>>,
    ) -> Result<Self> {
        let notifier = RecordingNotifier::new(deliver);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut builder = App::builder(test_config())
            .notifier_override(Arc::new(notifier.clone()))
            .shutdown_signal(shutdown_rx);
        if let Some(handle) = prometheus {
            builder = builder.prometheus_handle(handle);
        }
        if let Some(formatter) = formatter {
            builder = builder.formatter_override(formatter);
        }
        let app = builder.build().await?;
        let addr = app.local_addr();
        let app_handle = tokio::spawn(app.run());

        Ok(Self {
            addr,
            notifier,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POSTs `body` to `/webhook`, optionally with a content type.
    pub async fn post_webhook(
        &self,
        content_type: Option<&str>,
        body: impl Into<reqwest::Body>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.post(self.url("/webhook")).body(body);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        let response = request.send().await?;
        Ok((response.status(), response.json().await?))
    }

    pub async fn get_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok((response.status(), response.json().await?))
    }

    pub async fn post_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let response = self.client.post(self.url(path)).send().await?;
        Ok((response.status(), response.json().await?))
    }

    /// Shuts down the server and waits for it to terminate.
    /// Fails if it does not stop within `timeout_duration`.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx.send(true)?;
        match timeout(timeout_duration, self.app_handle).await {
            Ok(joined) => joined?,
            Err(_) => anyhow::bail!("server did not shut down within {:?}", timeout_duration),
        }
    }
}
