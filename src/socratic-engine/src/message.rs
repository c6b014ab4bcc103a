//! Conversation messages.
//!
//! A [`Message`] carries two views of its text: `content` is the
//! canonical text as received from the backend, `displayed` is the
//! paced subset currently revealed to the user. For the in-flight
//! assistant message `displayed` is always a prefix of `content`;
//! once the turn settles the two are equal.

use serde::{Deserialize, Serialize};
use socratic_protocol::{Diagram, Role, SearchedSource};
use uuid::Uuid;

/// One turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    /// Full text received so far. Monotonically growing for assistant
    /// turns, immutable for user turns.
    pub content: String,
    /// Subset of `content` currently revealed to the user.
    pub displayed: String,
    /// Opaque reference to a user-supplied image for this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Set on assistant messages synthesized from a failure.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    /// Knowledge sources the backend reported consulting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SearchedSource>,
    /// Diagram the backend attached to this answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
}

impl Message {
    /// Create a user message. User text is shown in full immediately.
    pub fn user(content: impl Into<String>, image: Option<String>) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            displayed: content.clone(),
            content,
            image,
            error: false,
            sources: Vec::new(),
            diagram: None,
        }
    }

    /// Create an empty assistant message for an in-flight turn.
    pub fn assistant() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: String::new(),
            displayed: String::new(),
            image: None,
            error: false,
            sources: Vec::new(),
            diagram: None,
        }
    }

    /// Create an assistant message carrying an error summary. Shown in
    /// full immediately; a dispatched turn is never silently dropped.
    pub fn assistant_error(summary: impl Into<String>) -> Self {
        let content = summary.into();
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            displayed: content.clone(),
            content,
            image: None,
            error: true,
            sources: Vec::new(),
            diagram: None,
        }
    }

    /// Append a content delta to the canonical text. The displayed
    /// text is untouched; reveal ticks catch it up.
    pub fn push_delta(&mut self, delta: &str) {
        self.content.push_str(delta);
    }

    /// Reveal one already-received fragment.
    pub fn reveal(&mut self, fragment: &str) {
        self.displayed.push_str(fragment);
        debug_assert!(self.content.starts_with(self.displayed.as_str()));
    }

    /// Whether everything received has been revealed.
    pub fn fully_revealed(&self) -> bool {
        self.displayed == self.content
    }
}
