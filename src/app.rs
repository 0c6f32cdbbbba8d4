//! The main application logic, decoupled from the entry point.

use crate::{
    config::Config,
    core::{MessageFormatter, Notifier},
    formatting::TelegramHtmlFormatter,
    internal_metrics,
    notification::telegram::TelegramNotifier,
    server::{self, AppState},
};
use anyhow::{Context, Result};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// A bound, ready-to-serve application.
pub struct App {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    shutdown_rx: Option<watch::Receiver<bool>>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until the shutdown signal fires, then drains in-flight
    /// requests. Without a shutdown signal this runs forever.
    pub async fn run(self) -> Result<()> {
        let App {
            listener,
            router,
            shutdown_rx,
            ..
        } = self;

        let shutdown = async move {
            match shutdown_rx {
                Some(mut rx) => {
                    // A dropped sender also means shut down.
                    let _ = rx.changed().await;
                }
                None => std::future::pending::<()>().await,
            }
            info!("Shutdown signal received. Draining requests...");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        info!("Server stopped.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the components from running them, and lets tests
/// swap the notifier or formatter.
pub struct AppBuilder {
    config: Config,
    notifier_override: Option<Arc<dyn Notifier>>,
    formatter_override: Option<Arc<dyn MessageFormatter>>,
    prometheus_handle: Option<PrometheusHandle>,
    shutdown_rx: Option<watch::Receiver<bool>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            notifier_override: None,
            formatter_override: None,
            prometheus_handle: None,
            shutdown_rx: None,
        }
    }

    /// Overrides the notifier for testing.
    pub fn notifier_override(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier_override = Some(notifier);
        self
    }

    /// Overrides the message formatter.
    pub fn formatter_override(mut self, formatter: Arc<dyn MessageFormatter>) -> Self {
        self.formatter_override = Some(formatter);
        self
    }

    /// Serves `/metrics` from an already-installed Prometheus recorder.
    ///
    /// Without this, a recorder is installed during `build` when
    /// `metrics.enabled` is set.
    pub fn prometheus_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus_handle = Some(handle);
        self
    }

    /// Sets the channel whose change stops the server.
    pub fn shutdown_signal(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Builds the shared state, binds the listener, and assembles the router.
    pub async fn build(self) -> Result<App> {
        let config = self.config;

        let notifier: Arc<dyn Notifier> = match self.notifier_override {
            Some(notifier) => notifier,
            None => Arc::new(
                TelegramNotifier::new(&config.telegram)
                    .context("Failed to create Telegram notifier")?,
            ),
        };
        let formatter: Arc<dyn MessageFormatter> = self
            .formatter_override
            .unwrap_or_else(|| Arc::new(TelegramHtmlFormatter));

        let prometheus = match self.prometheus_handle {
            Some(handle) => Some(handle),
            None if config.metrics.enabled => Some(
                internal_metrics::install_prometheus()
                    .context("Failed to install Prometheus recorder")?,
            ),
            None => None,
        };
        if prometheus.is_some() {
            info!("Prometheus metrics enabled on /metrics");
        }

        let router = server::router(AppState::new(formatter, notifier), prometheus);

        let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to bind to {}:{}",
                    config.server.host, config.server.port
                )
            })?;
        let local_addr = listener.local_addr()?;

        Ok(App {
            listener,
            router,
            local_addr,
            shutdown_rx: self.shutdown_rx,
        })
    }
}
