//! Logger module
//!
//! Named logging helpers on top of `tracing`:
//! - Server lifecycle logging
//! - Request and upstream diagnostics
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::upstream::ChatMessage;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Should be called once at application startup. `RUST_LOG` overrides `logging.level`.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| e as Box<dyn std::error::Error>)
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| e as Box<dyn std::error::Error>),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, has_api_key: bool) {
    info!("======================================");
    info!("Analysis router started");
    info!("Listening on: http://{addr}");
    info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        info!("Log file: {path}");
    }
    info!("Upstream: {} ({})", config.upstream.endpoint, config.upstream.model);
    if !has_api_key {
        warn!(
            "{} is not set; analysis requests will fail with 500",
            config.upstream.api_key_env
        );
    }
    if config.routes.enable_chat {
        info!("Chat passthrough enabled at /api/chat");
    }
    info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    error!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    error!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    warn!("[WARN] {message}");
}

pub fn log_request_body(body: &serde_json::Value) {
    debug!("Request body: {body}");
}

pub fn log_outbound_messages(messages: &[ChatMessage]) {
    debug!("Calling upstream with {} messages", messages.len());
    for (i, msg) in messages.iter().enumerate() {
        debug!("  Message {i}: {:?} - {}", msg.role, msg.content);
    }
}

pub fn log_upstream_status(status: u16) {
    info!("Upstream response status: {status}");
}

pub fn log_upstream_payload(body: &str) {
    debug!("Upstream response data: {body}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown() {
    info!("[Shutdown] Stopped accepting connections");
}

pub fn log_drain_complete() {
    info!("[Shutdown] All connections closed");
}
