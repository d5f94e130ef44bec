//! Daemon entry point for the documentation chat server.
//!
//! Loads configuration from arguments and the environment, builds the chat
//! service, and serves the HTTP endpoint until a shutdown signal arrives.

mod config;
mod service;
mod shutdown;
mod telemetry;

use std::sync::Arc;

use docchat_http::{ChatServer, ChatServerConfig};
use tracing::info;

use crate::config::DocchatConfig;
use crate::service::build_service;
use crate::shutdown::shutdown_signal;
use crate::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = DocchatConfig::from_args()?;
    init_tracing(config.log_json);

    let service = build_service(&config);
    info!(
        provider = service.synthesis().provider().name(),
        docs_url = %config.docs.url,
        "docchat configured"
    );

    let server_config =
        ChatServerConfig::new(config.http_addr).with_max_body_bytes(config.max_body_bytes);
    ChatServer::new(Arc::new(service), server_config)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    info!("docchat stopped");
    Ok(())
}
