//! Socratic Engine - incremental response streaming and playback.
//!
//! The client-side core of the Socratic tutoring chat: dispatches one
//! conversational turn to the completion service, decodes the chunked
//! newline-delimited response into content deltas and metadata events,
//! accumulates the canonical answer, and paces its visible reveal
//! through a typewriter decoupled from network arrival speed.
//!
//! Entry point is [`ChatController`]; everything else is plumbing it
//! owns: the frame decoder and envelope classifier ([`stream`]), the
//! typewriter ([`playback`]), and the transport ([`client`]).

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http_client;
pub mod message;
pub mod playback;
pub mod stream;

pub use client::{ByteStream, CompletionClient, HttpCompletionClient};
pub use config::EngineConfig;
pub use controller::{ChatController, TurnPhase};
pub use error::{EngineError, Result};
pub use message::Message;
