//! Envelope classifier.
//!
//! Interprets one raw record extracted by the frame decoder.

use socratic_protocol::{
    DATA_PREFIX, Diagram, SearchedSource, StreamPayload, TERMINATOR_SENTINEL,
};

/// A classified record from the response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental fragment of assistant text.
    Delta(String),
    /// Out-of-band side information, not message text.
    Metadata {
        sources: Vec<SearchedSource>,
        diagram: Option<Diagram>,
    },
    /// The server has no more data for this turn.
    Done,
}

/// Outcome of classifying one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Event(StreamEvent),
    /// Not a data record, or a payload with no recognized fields.
    Ignored,
    /// The payload is an incomplete JSON fragment; the record must be
    /// re-buffered and retried once more text has arrived. Expected
    /// when a line boundary fell inside a JSON string value - never
    /// surfaced as an error.
    Incomplete,
}

/// Classify one raw record.
pub fn classify(record: &str) -> Classification {
    let Some(payload) = record.strip_prefix(DATA_PREFIX) else {
        return Classification::Ignored;
    };
    let payload = payload.trim();

    if payload == TERMINATOR_SENTINEL {
        return Classification::Event(StreamEvent::Done);
    }

    match serde_json::from_str::<StreamPayload>(payload) {
        Ok(parsed) => {
            if let Some(sources) = parsed.sources_searched {
                Classification::Event(StreamEvent::Metadata {
                    sources,
                    diagram: parsed.diagram,
                })
            } else if let Some(text) = parsed.delta_text() {
                Classification::Event(StreamEvent::Delta(text.to_string()))
            } else {
                tracing::trace!(payload, "Ignoring payload with no recognized fields");
                Classification::Ignored
            }
        }
        Err(e) => {
            tracing::trace!(error = %e, payload, "Incomplete payload, re-buffering");
            Classification::Incomplete
        }
    }
}
