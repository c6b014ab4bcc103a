//! Engine configuration.

use std::time::Duration;

/// Default delay between reveal ticks of the typewriter.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(40);

/// Default per-chunk idle timeout for the network read. If no data
/// arrives within this window the turn fails instead of staying busy
/// forever on a stalled connection.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default bound on how many prior messages are sent as history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Configuration for a [`crate::controller::ChatController`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the completion service.
    pub base_url: String,
    /// Product surface identifier sent with every request.
    pub product_context: String,
    /// Subscription tier the quota gate evaluates.
    pub tier: String,
    pub user_id: String,
    /// Delay between reveal ticks.
    pub reveal_interval: Duration,
    /// Per-chunk network idle timeout.
    pub idle_timeout: Duration,
    /// Maximum number of prior messages carried in the request history.
    pub history_limit: usize,
}

impl EngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            product_context: String::new(),
            tier: "free".to_string(),
            user_id: String::new(),
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_product_context(mut self, context: impl Into<String>) -> Self {
        self.product_context = context.into();
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
