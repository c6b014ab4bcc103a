//! Quota gate response contract.

use serde::{Deserialize, Serialize};

/// Discriminator value the quota gate puts in `error` when it refuses
/// a turn. This exact string is the only signal that distinguishes a
/// quota refusal from an ordinary backend failure.
pub const LIMIT_EXCEEDED_DISCRIMINATOR: &str = "limit_exceeded";

/// Usage counters attached to a quota refusal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub count: u32,
    pub limit: u32,
}

/// Body of a non-success response from the completion endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

impl ApiErrorBody {
    /// Whether this body is the quota gate's structured refusal.
    pub fn is_limit_exceeded(&self) -> bool {
        self.error.as_deref() == Some(LIMIT_EXCEEDED_DISCRIMINATOR)
    }
}
