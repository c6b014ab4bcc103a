//! Socratic Protocol - Wire types between the chat client and the
//! completion backend.
//!
//! This crate defines the request body sent when a turn is dispatched
//! and the envelope shapes carried by the newline-delimited response
//! stream (content deltas, metadata events, the terminator sentinel)
//! plus the quota gate's structured refusal.

pub mod request;
pub mod stream;
pub mod usage;

pub use request::{CompletionRequest, HistoryMessage, Role};
pub use stream::{
    COMMENT_MARKER, Choice, DATA_PREFIX, Delta, Diagram, SearchedSource, StreamPayload,
    TERMINATOR_SENTINEL,
};
pub use usage::{ApiErrorBody, LIMIT_EXCEEDED_DISCRIMINATOR, UsageInfo};
