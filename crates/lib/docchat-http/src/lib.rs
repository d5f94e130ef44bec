//! HTTP server for docchat.
//!
//! Exposes the chat endpoint that relays a question through the documentation
//! service and the completion provider, plus a health check.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Json, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use docchat_core::services::{ChatError, ChatService};
use docchat_types::models::{ChatReply, ChatRequest, ErrorBody};
use docchat_types::schema::{ERROR_MESSAGE_REQUIRED, ERROR_PROCESSING_FAILED};
use tracing::{error, info};

pub const CHAT_ROUTE: &str = "/api/chat";
pub const HEALTH_ROUTE: &str = "/health";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Configuration for the chat HTTP server.
#[derive(Debug, Clone)]
pub struct ChatServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl ChatServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 3000)))
    }
}

/// HTTP chat server wrapper.
pub struct ChatServer {
    config: ChatServerConfig,
    state: AppState,
}

impl ChatServer {
    #[must_use]
    pub const fn new(service: Arc<ChatService>, config: ChatServerConfig) -> Self {
        Self {
            config,
            state: AppState { service },
        }
    }

    /// Runs the HTTP server until shutdown.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending::<()>()).await
    }

    /// Runs the HTTP server until `signal` resolves, then drains in-flight requests.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve_with_shutdown<F>(
        self,
        signal: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = build_router(self.state.service, self.config.max_body_bytes);

        info!("docchat listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    service: Arc<ChatService>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => Self::bad_request(ERROR_MESSAGE_REQUIRED),
            ChatError::Docs(_) | ChatError::Synthesis(_) => Self::internal(ERROR_PROCESSING_FAILED),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorBody {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

/// Builds the router serving the chat endpoint and health check.
#[must_use]
pub fn build_router(service: Arc<ChatService>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(health))
        .route(CHAT_ROUTE, post(chat).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(AppState { service })
}

async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {method} Not Allowed"),
    )
        .into_response()
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatReply>, ApiError> {
    let request: ChatRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(message) = request.message() else {
        return Err(ApiError::bad_request(ERROR_MESSAGE_REQUIRED));
    };

    let outcome = state.service.reply(message).await.map_err(|err| {
        if !err.is_client_error() {
            error!(error = %err, "chat request failed");
        }
        ApiError::from(err)
    })?;

    info!(outcome = outcome.kind(), "chat request answered");
    Ok(Json(ChatReply {
        reply: outcome.into_reply(),
    }))
}
