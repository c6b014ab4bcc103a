//! Error types for the Socratic engine.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the streaming engine.
///
/// Every variant is caught at the turn-lifecycle boundary and turned
/// into a user-visible outcome; nothing here escapes to the host.
#[derive(Debug, Error)]
pub enum EngineError {
    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion service error: {message}")]
    Backend { message: String },

    /// No data arrived on the stream within the idle timeout.
    #[error("Stream stalled: no data received for {0:?}")]
    StreamIdle(Duration),

    /// The quota gate refused the turn. Terminal for the turn; the
    /// engine never retries on its own.
    #[error("Usage limit reached ({count}/{limit}): {message}")]
    LimitExceeded {
        message: String,
        count: u32,
        limit: u32,
    },

    /// The turn was superseded or the host tore the session down.
    #[error("Turn cancelled")]
    Cancelled,
}
