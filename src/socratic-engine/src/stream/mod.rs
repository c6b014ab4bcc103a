//! Response stream parsing.
//!
//! Feeds raw network chunks through the frame decoder and envelope
//! classifier, yielding ordered [`StreamEvent`]s. One parser serves
//! exactly one stream session.

mod classifier;
mod decoder;

pub use classifier::{Classification, StreamEvent, classify};
pub use decoder::FrameDecoder;

/// Stateful chunk-to-event parser for one turn's response stream.
#[derive(Debug, Default)]
pub struct StreamParser {
    decoder: FrameDecoder,
    done: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminator sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one network chunk, yielding every event it completes.
    ///
    /// Deltas come out in exact arrival order. A record whose payload
    /// is still incomplete is pushed back and retried on the next
    /// pass; the terminator ends processing for good.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.decoder.push(chunk);

        while let Some(record) = self.decoder.next_record() {
            match classify(&record) {
                Classification::Event(StreamEvent::Done) => {
                    self.done = true;
                    events.push(StreamEvent::Done);
                    break;
                }
                Classification::Event(event) => events.push(event),
                Classification::Ignored => {}
                Classification::Incomplete => {
                    self.decoder.rebuffer(&record);
                    break;
                }
            }
        }
        events
    }
}
