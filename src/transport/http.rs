//! HTTP transport
//!
//! Routes:
//! - `POST /queues/:kind` enqueue the request body (`?end=head|tail`)
//! - `GET /queues/:kind` dequeue one item (`?end=`, `?offset=`, `?wait_ms=`);
//!   204 when the store is empty
//! - `POST /queues/:kind/fill` insert N synthetic items, body is N (capped
//!   by `broker.max_fill`)
//! - `POST /topics/:topic` publish the body to WebSocket subscribers
//! - `GET /health` broker counts

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::broker::{Broker, BrokerStats, End};
use crate::utils::error::BrokerError;

type AppState = Arc<Broker>;

pub async fn start_http_server(addr: &str, broker: Arc<Broker>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_http(listener, broker).await
}

pub async fn serve_http(listener: TcpListener, broker: Arc<Broker>) -> anyhow::Result<()> {
    info!("HTTP server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(broker)).await?;
    Ok(())
}

/// Build the router (separated for testing).
pub fn router(broker: Arc<Broker>) -> Router {
    // One byte over the broker's limit so oversized bodies reach the broker
    // and get its error message.
    let body_limit = broker.options().max_payload_bytes.saturating_add(1);

    Router::new()
        .route("/health", get(health))
        .route("/queues/:kind", post(enqueue).get(dequeue))
        .route("/queues/:kind/fill", post(fill))
        .route("/topics/:topic", post(publish))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(broker)
}

#[derive(Debug, Default, Deserialize)]
struct EnqueueParams {
    end: Option<End>,
}

#[derive(Debug, Default, Deserialize)]
struct DequeueParams {
    end: Option<End>,
    #[serde(default)]
    offset: usize,
    wait_ms: Option<u64>,
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = match &self {
            BrokerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BrokerError::ResourceExhausted(_) | BrokerError::FillInterrupted { .. } => {
                StatusCode::INSUFFICIENT_STORAGE
            }
            _ => StatusCode::BAD_REQUEST,
        };
        if !self.is_client_error() {
            warn!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health(State(broker): State<AppState>) -> Json<BrokerStats> {
    Json(broker.stats())
}

async fn enqueue(
    State(broker): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<EnqueueParams>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, BrokerError> {
    broker.enqueue(&kind, params.end, body)?;
    Ok(Json(json!({ "ok": true })))
}

async fn dequeue(
    State(broker): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<DequeueParams>,
) -> Result<Response, BrokerError> {
    let item = match params.wait_ms {
        Some(ms) if ms > 0 => {
            broker
                .dequeue_wait(&kind, params.end, params.offset, Duration::from_millis(ms))
                .await?
        }
        _ => broker.dequeue(&kind, params.end, params.offset)?,
    };

    Ok(match item {
        Some(payload) => (StatusCode::OK, payload).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn fill(
    State(broker): State<AppState>,
    Path(kind): Path<String>,
    body: String,
) -> Response {
    let count: usize = match body.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("You must POST an integer, but the body was {body:?}")
                })),
            )
                .into_response();
        }
    };

    match broker.fill(&kind, count).await {
        Ok(inserted) => Json(json!({ "inserted": inserted })).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn publish(
    State(broker): State<AppState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, BrokerError> {
    let delivered = broker.publish(&topic, body).await?;
    Ok(Json(json!({ "delivered": delivered })))
}
