//! HTTP routes for the relay.
//!
//! Every route is a stateless request/response mapping over [`AppState`].
//! Panics inside a handler are caught at the router boundary and reported as
//! a JSON 500.

use crate::core::{MessageFormatter, Notifier, SignalPayload};
use crate::fixtures;
use crate::intake;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Routes advertised by the health endpoint.
pub const ENDPOINTS: [&str; 5] = ["/", "/test", "/webhook", "/webhook/test", "/webhook/test-exit"];
/// Advertised in addition to [`ENDPOINTS`] when the exporter is mounted.
pub const METRICS_ENDPOINT: &str = "/metrics";

/// Shared, immutable state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub formatter: Arc<dyn MessageFormatter>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(formatter: Arc<dyn MessageFormatter>, notifier: Arc<dyn Notifier>) -> Self {
        Self { formatter, notifier }
    }

    /// Formats `payload` and hands it to the notifier.
    async fn relay(&self, payload: &SignalPayload) -> bool {
        let text = self.formatter.format(payload);
        self.notifier.notify(&text).await
    }
}

/// Builds the application router. `/metrics` is only mounted when a
/// Prometheus handle is supplied.
///
/// Alert bodies are not size-capped.
pub fn router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let endpoints: Arc<Vec<&'static str>> = Arc::new(
        ENDPOINTS
            .into_iter()
            .chain(prometheus.is_some().then_some(METRICS_ENDPOINT))
            .collect(),
    );

    let mut router = Router::new()
        .route("/", get(move || health(endpoints.clone())))
        .route("/test", get(connectivity_test))
        .route(
            "/webhook",
            post(webhook).layer(DefaultBodyLimit::disable()),
        )
        .route("/webhook/test", get(entry_fixture).post(entry_fixture))
        .route("/webhook/test-exit", get(exit_fixture).post(exit_fixture));

    if let Some(handle) = prometheus {
        router = router.route(METRICS_ENDPOINT, get(move || async move { handle.render() }));
    }

    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// `GET /` - static status summary.
async fn health(endpoints: Arc<Vec<&'static str>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Signal relay is running",
        "time": Local::now().to_rfc3339(),
        "endpoints": endpoints.as_slice(),
    }))
}

/// `GET /test` - sends a canned message to verify the bot credentials.
async fn connectivity_test(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let text = fixtures::connectivity_message(Local::now().naive_local());

    if state.notifier.notify(&text).await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Telegram test message sent",
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "Telegram delivery failed. Check the bot token and chat id.",
            })),
        )
    }
}

/// `POST /webhook` - relays an alert body of any shape.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<Value>) {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(error = %rejection, "Failed to read webhook body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": rejection.body_text() })),
            );
        }
    };

    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let parsed = intake::parse_body(content_type, &body);
    let source = parsed.source();

    let Some(payload) = parsed.into_payload() else {
        warn!("Webhook received without data");
        metrics::counter!("webhooks_rejected_total").increment(1);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No data received" })),
        );
    };

    info!(source, ?payload, "Webhook payload received");
    metrics::counter!("webhooks_received_total", "source" => source).increment(1);

    if state.relay(&payload).await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Notification delivered",
                "source": source,
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": "Notification delivery failed",
                "source": source,
            })),
        )
    }
}

/// `GET|POST /webhook/test` - relays the sample ENTRY signal.
async fn entry_fixture(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    relay_fixture(&state, "ENTRY", &fixtures::sample_entry()).await
}

/// `GET|POST /webhook/test-exit` - relays the sample EXIT signal.
async fn exit_fixture(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    relay_fixture(&state, "EXIT", &fixtures::sample_exit()).await
}

async fn relay_fixture(
    state: &AppState,
    kind: &str,
    payload: &SignalPayload,
) -> (StatusCode, Json<Value>) {
    if state.relay(payload).await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!("Sample {} signal sent", kind),
                "payload": payload,
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": format!("Failed to send sample {} signal", kind),
            })),
        )
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    error!(error = %details, "Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": details })),
    )
        .into_response()
}
