//! Axum HTTP server for the gateway.
//!
//! Two surfaces share one listener: `POST /webhook` carries the
//! conversational-agent fulfillment contract (always 200 with a body),
//! and every other path falls through to the REST router, which answers
//! unknown paths with its endpoint directory.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::agent::WebhookAgent;
use crate::api::{ApiRequest, ApiResponse, ApiRouter};
use crate::channels::web::types::HealthResponse;
use crate::error::{ChannelError, ErrorBody, ValidationError};

/// Shared state for all gateway handlers.
pub struct GatewayState {
    pub agent: Arc<WebhookAgent>,
    pub api: Arc<ApiRouter>,
    /// Shutdown signal sender.
    pub shutdown_tx: tokio::sync::RwLock<Option<oneshot::Sender<()>>>,
}

impl GatewayState {
    pub fn new(agent: Arc<WebhookAgent>, api: Arc<ApiRouter>) -> Self {
        Self {
            agent,
            api,
            shutdown_tx: tokio::sync::RwLock::new(None),
        }
    }

    /// Ask the running server to shut down gracefully.
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.write().await.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the gateway HTTP server.
///
/// Returns the actual bound `SocketAddr` (useful when binding to port 0).
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<GatewayState>,
) -> Result<SocketAddr, ChannelError> {
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "gateway".to_string(),
                reason: format!("Failed to bind to {addr}: {e}"),
            })?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| ChannelError::StartupFailed {
            name: "gateway".to_string(),
            reason: format!("Failed to get local addr: {e}"),
        })?;

    // The webhook caller is the conversation platform, not a browser, but
    // the REST surface may be probed from dashboards; allow simple
    // cross-origin reads.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook_handler))
        .fallback(api_umbrella_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    *state.shutdown_tx.write().await = Some(shutdown_tx);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Gateway shutting down");
            })
            .await
        {
            tracing::error!("Gateway server error: {}", e);
        }
    });

    tracing::info!(addr = %bound_addr, "Gateway listening");
    Ok(bound_addr)
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(HealthResponse::ok(state.agent.name()))
}

/// Webhook fulfillment entry point. Always answers 200 with a well-formed
/// wire document; degradation happens inside the agent pipeline.
async fn webhook_handler(State(state): State<Arc<GatewayState>>, body: Bytes) -> impl IntoResponse {
    let document = state.agent.handle_raw(&body).await;
    Json(document)
}

/// Umbrella entry point for the REST surface: every path that is not the
/// webhook or the health check lands here and is dispatched by exact
/// string match.
async fn api_umbrella_handler(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Response {
    let request = if method == Method::GET {
        ApiRequest::Get { query }
    } else if method == Method::POST {
        match serde_json::from_slice(&body) {
            Ok(value) => ApiRequest::PostJson { body: value },
            Err(_) => ApiRequest::Unsupported,
        }
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::from(&ValidationError::UnsupportedShape)),
        )
            .into_response();
    };

    let response = state.api.handle(uri.path(), &request).await;
    into_http(response)
}

fn into_http(response: ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}
