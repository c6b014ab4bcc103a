//! Socratic CLI - a minimal terminal host for the streaming engine.
//!
//! Reads turns from stdin, submits them through the engine's upward
//! interface, and prints the assistant's answer as the typewriter
//! reveals it. This is a demonstration shim for the engine, not a
//! product surface.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use socratic_engine::{ChatController, EngineConfig, Message, TurnPhase};
use socratic_protocol::Role;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "socratic", version, about = "Terminal client for the Socratic tutoring chat")]
struct Cli {
    /// Base URL of the completion service.
    #[arg(long, env = "SOCRATIC_API_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Subscription tier the quota gate evaluates.
    #[arg(long, default_value = "free")]
    tier: String,

    #[arg(long, env = "SOCRATIC_USER_ID", default_value = "local")]
    user_id: String,

    /// Course or subject slug sent as product context.
    #[arg(long, default_value = "general")]
    context: String,

    /// Milliseconds between reveal ticks.
    #[arg(long, default_value_t = 40)]
    reveal_ms: u64,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EngineConfig::new(cli.base_url)
        .with_tier(cli.tier)
        .with_user_id(cli.user_id)
        .with_product_context(cli.context)
        .with_reveal_interval(Duration::from_millis(cli.reveal_ms));
    let controller = ChatController::new(config)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = input.next_line().await? {
        let turn_start = controller.messages().len();
        if controller.submit(line, None) {
            render_turn(&controller, turn_start).await?;
        }
        prompt()?;
    }
    controller.cancel_active_turn();
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

/// Tracks how much of one assistant message has been printed.
///
/// The turn's assistant message can be superseded mid-turn, e.g. by a
/// synthesized error message after a stall; the cursor follows the
/// message id and restarts from the top when the identity changes.
struct RevealCursor {
    current: Option<Uuid>,
    printed: usize,
}

impl RevealCursor {
    fn new() -> Self {
        Self {
            current: None,
            printed: 0,
        }
    }

    /// The not-yet-printed suffix of the message's revealed text.
    fn next_chunk<'a>(&mut self, message: &'a Message) -> Option<&'a str> {
        if self.current != Some(message.id) {
            self.current = Some(message.id);
            self.printed = 0;
        }
        let suffix = message.displayed.get(self.printed..)?;
        if suffix.is_empty() {
            return None;
        }
        self.printed = message.displayed.len();
        Some(suffix)
    }
}

/// Follow one turn to its outcome, printing each newly revealed piece.
///
/// `turn_start` is the message count from before submission, so only
/// this turn's assistant message is printed, never an earlier answer.
async fn render_turn(controller: &ChatController, turn_start: usize) -> Result<()> {
    let mut rx = controller.watch();
    let mut cursor = RevealCursor::new();

    loop {
        // Read the gate before the snapshot so the settled state gets
        // one last print before the loop exits.
        let done = !controller.is_busy();
        let messages = controller.messages();
        let assistant = messages
            .get(turn_start..)
            .into_iter()
            .flatten()
            .rev()
            .find(|m| m.role == Role::Assistant);
        if let Some(chunk) = assistant.and_then(|m| cursor.next_chunk(m)) {
            print!("{chunk}");
            std::io::stdout().flush()?;
        }
        if done {
            break;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }

    println!();
    if controller.phase() == TurnPhase::LimitExceeded {
        let reason = controller
            .refusal()
            .unwrap_or_else(|| "You've reached your usage limit.".to_string());
        println!("[limit] {reason} Upgrade or try again later.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cursor_emits_only_new_suffixes() {
        let mut cursor = RevealCursor::new();
        let mut msg = Message::assistant();
        msg.push_delta("one two");

        assert_eq!(cursor.next_chunk(&msg), None);
        msg.reveal("one ");
        assert_eq!(cursor.next_chunk(&msg), Some("one "));
        assert_eq!(cursor.next_chunk(&msg), None);
        msg.reveal("two");
        assert_eq!(cursor.next_chunk(&msg), Some("two"));
    }

    #[test]
    fn test_cursor_restarts_when_the_message_is_superseded() {
        let mut cursor = RevealCursor::new();
        let mut streamed = Message::assistant();
        streamed.push_delta("partial words");
        streamed.reveal("partial ");
        assert_eq!(cursor.next_chunk(&streamed), Some("partial "));

        // The replacement's text is shorter than what was already
        // printed and opens with multi-byte characters; the cursor
        // must print it whole rather than slice at a stale offset.
        let replacement = Message::assistant_error("élan?");
        assert_eq!(cursor.next_chunk(&replacement), Some("élan?"));
        assert_eq!(cursor.next_chunk(&replacement), None);
    }
}
