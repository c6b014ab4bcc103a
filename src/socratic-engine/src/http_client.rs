//! Centralized HTTP client factory.
//!
//! Provides factory functions to create reqwest clients with consistent
//! configuration:
//! - `create_default_client()` - Standard 30s timeout
//! - `create_streaming_client()` - 5min timeout for completion streaming
//!
//! All clients include: User-Agent, tcp_nodelay, and a pool idle
//! timeout so DNS is re-resolved periodically.

use std::time::Duration;

use reqwest::Client;

use crate::error::{EngineError, Result};

/// User-Agent string for all HTTP requests.
pub const USER_AGENT: &str = concat!("socratic/", env!("CARGO_PKG_VERSION"));

/// Default timeout for standard API requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extended timeout for completion streaming requests (5 minutes).
pub const STREAMING_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection pool idle timeout so load balancer updates are picked up.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client with default configuration (30s timeout).
pub fn create_default_client() -> Result<Client> {
    create_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Creates an HTTP client for completion streaming (5min timeout).
///
/// Use this for the chat endpoint, which answers with a long-lived
/// chunked body.
pub fn create_streaming_client() -> Result<Client> {
    create_client_with_timeout(STREAMING_TIMEOUT)
}

/// Creates an HTTP client with a custom overall timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .build()
        .map_err(|e| EngineError::Backend {
            message: format!("Failed to build HTTP client: {e}"),
        })
}
