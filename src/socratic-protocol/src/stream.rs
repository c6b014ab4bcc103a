//! Streamed response envelope.
//!
//! The backend answers a dispatched turn with a chunked body of text
//! records separated by newlines. A data record is the [`DATA_PREFIX`]
//! marker followed by a JSON payload; the literal payload
//! [`TERMINATOR_SENTINEL`] ends the turn. Empty records and records
//! starting with [`COMMENT_MARKER`] are keep-alives.

use serde::{Deserialize, Serialize};

/// Marker that opens every data record.
pub const DATA_PREFIX: &str = "data:";

/// Literal payload signalling the server has no more data for the turn.
pub const TERMINATOR_SENTINEL: &str = "[DONE]";

/// Records starting with this are keep-alive comments.
pub const COMMENT_MARKER: char = ':';

/// JSON payload of a data record.
///
/// A single shape covers both envelope kinds: a payload carrying
/// `sources_searched` is a metadata event; a payload whose first
/// choice carries delta text is a content fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_searched: Option<Vec<SearchedSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
}

impl StreamPayload {
    /// Delta text of the first choice, if this payload carries one.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One knowledge source the backend consulted before generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchedSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub topic: String,
}

/// Diagram attached to the in-flight answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: String,
    pub title: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
}
