//! Outbound completion request types.

use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn carried in the request history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    /// Create a user history entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant history entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body posted to the completion endpoint for one turn.
///
/// The response is either an immediate structured error (see
/// [`crate::usage::ApiErrorBody`]) or a long-lived byte stream framed
/// as newline-delimited records (see [`crate::stream`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The user's turn text.
    pub message: String,
    /// Bounded window of prior turns, oldest first.
    pub history: Vec<HistoryMessage>,
    /// Product surface the turn originates from (course / subject slug).
    pub product_context: String,
    /// Subscription tier the quota gate evaluates.
    pub tier: String,
    pub user_id: String,
    /// Opaque reference to a user-supplied image for this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_request_omits_absent_image() {
        let req = CompletionRequest {
            message: "What is elasticity?".into(),
            history: vec![HistoryMessage::user("hi"), HistoryMessage::assistant("hello")],
            product_context: "econ-101".into(),
            tier: "free".into(),
            user_id: "u-1".into(),
            image: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("image"));
        assert!(json.contains("\"product_context\":\"econ-101\""));
    }
}
