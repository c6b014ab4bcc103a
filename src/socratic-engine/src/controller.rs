//! Turn lifecycle controller.
//!
//! Orchestrates one conversational turn end to end: dispatch, frame
//! decoding, envelope classification, accumulation, typewriter reveal,
//! and settlement or failure. At most one turn is in flight at a time,
//! enforced by an atomic busy gate checked before dispatch.
//!
//! Every network and parsing failure is caught at this boundary and
//! converted to a user-visible outcome; nothing escapes to the host,
//! which would leave the busy gate stuck and block all future turns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use socratic_protocol::{CompletionRequest, HistoryMessage};

use crate::client::{CompletionClient, HttpCompletionClient};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::message::Message;
use crate::playback::Typewriter;
use crate::stream::{StreamEvent, StreamParser};

/// Lifecycle phase of the most recent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    /// No turn has been dispatched yet, or the last one was cancelled.
    #[default]
    Idle,
    /// Request sent, no stream received yet.
    Dispatched,
    /// Consuming the response stream (the typewriter may keep
    /// animating after the stream itself has ended).
    Streaming,
    /// Stream complete and playback drained.
    Settled,
    /// The turn failed; a synthesized error message was appended.
    Failed,
    /// The quota gate refused the turn.
    LimitExceeded,
}

impl TurnPhase {
    /// Whether the turn reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed | Self::LimitExceeded)
    }
}

/// Insertion-ordered, append-only message sequence plus the coarse
/// searching/generating progress flag.
#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<Message>,
    phase: TurnPhase,
    searching: bool,
    /// Human-readable reason from the quota gate's last refusal.
    refusal: Option<String>,
}

/// Per-turn streaming state. Owned exclusively by the turn task and
/// destroyed when the turn settles or fails; never shared across turns.
#[derive(Debug, Default)]
struct StreamSession {
    parser: StreamParser,
    typewriter: Typewriter,
}

struct ControllerInner {
    config: EngineConfig,
    client: Arc<dyn CompletionClient>,
    conversation: Mutex<Conversation>,
    busy: AtomicBool,
    /// Cancellation handle for the active turn, if any.
    active: Mutex<Option<CancellationToken>>,
    revision: watch::Sender<u64>,
}

impl ControllerInner {
    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Signal hosts that the visible state changed.
    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

/// The upward interface of the streaming engine.
///
/// Hosts call [`submit`](Self::submit), render from
/// [`messages`](Self::messages), and disable their input while
/// [`is_busy`](Self::is_busy) holds. [`watch`](Self::watch) yields a
/// revision counter that ticks on every visible change.
#[derive(Clone)]
pub struct ChatController {
    inner: Arc<ControllerInner>,
}

impl ChatController {
    /// Create a controller backed by the HTTP transport.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Arc::new(HttpCompletionClient::new(config.base_url.clone())?);
        Ok(Self::with_client(config, client))
    }

    /// Create a controller with a custom transport.
    pub fn with_client(config: EngineConfig, client: Arc<dyn CompletionClient>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                conversation: Mutex::new(Conversation::default()),
                busy: AtomicBool::new(false),
                active: Mutex::new(None),
                revision,
            }),
        }
    }

    /// Submit one turn. Returns `false` without any state change when
    /// a turn is already in flight or the text is blank.
    ///
    /// The user message is appended synchronously, before any network
    /// activity, so the conversation reflects the submission whatever
    /// the network outcome.
    pub fn submit(&self, text: impl Into<String>, image: Option<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Submit ignored: a turn is already in flight");
            return false;
        }

        // Revoke any reveal still scheduled by a cancelled predecessor
        // before this turn starts mutating the conversation.
        let token = CancellationToken::new();
        {
            let mut active = self
                .inner
                .active
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = active.replace(token.clone()) {
                previous.cancel();
            }
        }

        let request = {
            let mut conv = self.inner.conversation();
            let request = build_request(&self.inner.config, &conv.messages, &text, image.clone());
            conv.messages.push(Message::user(text, image));
            conv.phase = TurnPhase::Dispatched;
            conv.searching = true;
            conv.refusal = None;
            request
        };
        self.inner.bump();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_turn(inner, token, request).await;
        });
        true
    }

    /// Snapshot of the conversation for rendering.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.conversation().messages.clone()
    }

    /// True between dispatch and the turn's terminal outcome.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> TurnPhase {
        self.inner.conversation().phase
    }

    /// True from dispatch until the backend reports the sources it
    /// searched (or the turn leaves the streaming phase).
    pub fn is_searching(&self) -> bool {
        self.inner.conversation().searching
    }

    /// Reason given by the quota gate when the last turn was refused.
    /// Present only while [`phase`](Self::phase) is `LimitExceeded`.
    pub fn refusal(&self) -> Option<String> {
        self.inner.conversation().refusal.clone()
    }

    /// Revision channel; the value ticks on every visible change.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Cancel the in-flight turn, abandoning any unrevealed content.
    ///
    /// The one operation allowed to cut playback short; used on host
    /// teardown. A no-op when nothing is in flight.
    pub fn cancel_active_turn(&self) {
        let token = {
            let mut active = self
                .inner
                .active
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            active.take()
        };
        let Some(token) = token else {
            return;
        };
        token.cancel();
        // Only the caller that actually tears down an in-flight turn
        // may rewrite the phase; a token left over from a finished
        // turn must not disturb a terminal state.
        if self
            .inner
            .busy
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            {
                let mut conv = self.inner.conversation();
                conv.phase = TurnPhase::Idle;
                conv.searching = false;
            }
            self.inner.bump();
            tracing::debug!("Active turn cancelled");
        }
    }
}

/// Build the outbound request from the bounded tail of prior messages.
fn build_request(
    config: &EngineConfig,
    prior: &[Message],
    text: &str,
    image: Option<String>,
) -> CompletionRequest {
    let history: Vec<HistoryMessage> = prior
        .iter()
        .filter(|m| !m.error)
        .map(|m| HistoryMessage {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();
    let start = history.len().saturating_sub(config.history_limit);
    CompletionRequest {
        message: text.to_string(),
        history: history[start..].to_vec(),
        product_context: config.product_context.clone(),
        tier: config.tier.clone(),
        user_id: config.user_id.clone(),
        image,
    }
}

/// Drive one turn to a terminal outcome and release the busy gate.
async fn run_turn(inner: Arc<ControllerInner>, token: CancellationToken, request: CompletionRequest) {
    let outcome = drive_turn(&inner, &token, request).await;

    match outcome {
        Err(EngineError::Cancelled) => {
            // A cancelled turn owns nothing anymore: phase and busy
            // were already handed over by whoever cancelled it.
            tracing::debug!("Turn ended by cancellation");
            return;
        }
        Ok(()) => {
            let mut conv = inner.conversation();
            conv.phase = TurnPhase::Settled;
            conv.searching = false;
        }
        Err(EngineError::LimitExceeded {
            message,
            count,
            limit,
        }) => {
            tracing::info!(count, limit, message = %message, "Turn refused by quota gate");
            let mut conv = inner.conversation();
            conv.phase = TurnPhase::LimitExceeded;
            conv.searching = false;
            conv.refusal = Some(message);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Turn failed");
            let mut conv = inner.conversation();
            conv.phase = TurnPhase::Failed;
            conv.searching = false;
            conv.messages.push(Message::assistant_error(format!(
                "Sorry, something went wrong while answering. ({e})"
            )));
        }
    }
    // The turn is over; drop its token so a late cancel finds nothing.
    {
        let mut active = inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *active = None;
    }
    inner.busy.store(false, Ordering::SeqCst);
    inner.bump();
}

/// The streaming loop proper. Suspends in exactly two places: waiting
/// for the next network chunk and waiting for the next reveal tick.
async fn drive_turn(
    inner: &Arc<ControllerInner>,
    token: &CancellationToken,
    request: CompletionRequest,
) -> Result<()> {
    let mut stream = tokio::select! {
        dispatched = inner.client.dispatch(request) => dispatched?,
        () = token.cancelled() => return Err(EngineError::Cancelled),
    };

    let assistant_ix = {
        let mut conv = inner.conversation();
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        conv.messages.push(Message::assistant());
        conv.phase = TurnPhase::Streaming;
        conv.messages.len() - 1
    };
    inner.bump();

    let mut session = StreamSession::default();
    let mut stream_open = true;
    let mut ticker = tokio::time::interval(inner.config.reveal_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Settlement is gated on both stream completion and queue drain:
    // the reveal keeps its cadence even after the network finished.
    while stream_open || !session.typewriter.is_drained() {
        tokio::select! {
            () = token.cancelled() => return Err(EngineError::Cancelled),

            chunk = tokio::time::timeout(inner.config.idle_timeout, stream.next()), if stream_open => {
                match chunk {
                    Err(_) => return Err(EngineError::StreamIdle(inner.config.idle_timeout)),
                    Ok(None) => stream_open = false,
                    Ok(Some(Err(e))) => return Err(e),
                    Ok(Some(Ok(bytes))) => {
                        for event in session.parser.feed(&bytes) {
                            apply_event(inner, token, assistant_ix, &mut session, event)?;
                        }
                        if session.parser.is_done() {
                            stream_open = false;
                        }
                    }
                }
            }

            _ = ticker.tick(), if session.typewriter.is_animating() => {
                if let Some(word) = session.typewriter.tick() {
                    let mut conv = inner.conversation();
                    if token.is_cancelled() {
                        return Err(EngineError::Cancelled);
                    }
                    conv.messages[assistant_ix].reveal(&word);
                    drop(conv);
                    inner.bump();
                }
            }
        }
    }

    tracing::debug!("Turn settled: stream ended and playback drained");
    Ok(())
}

/// Route one classified event into the conversation and session.
fn apply_event(
    inner: &Arc<ControllerInner>,
    token: &CancellationToken,
    assistant_ix: usize,
    session: &mut StreamSession,
    event: StreamEvent,
) -> Result<()> {
    if token.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    match event {
        StreamEvent::Delta(text) => {
            // Canonical growth and queue enqueue happen under the same
            // lock so displayed content can never outrun canonical.
            let mut conv = inner.conversation();
            conv.messages[assistant_ix].push_delta(&text);
            session.typewriter.enqueue(&text);
            drop(conv);
            inner.bump();
        }
        StreamEvent::Metadata { sources, diagram } => {
            let mut conv = inner.conversation();
            if !sources.is_empty() {
                // Sources arriving is the searching -> generating edge.
                conv.searching = false;
            }
            let message = &mut conv.messages[assistant_ix];
            message.sources.extend(sources);
            if diagram.is_some() {
                message.diagram = diagram;
            }
            drop(conv);
            inner.bump();
        }
        StreamEvent::Done => {}
    }
    Ok(())
}
