//! Typewriter playback.
//!
//! Reveals accumulated text at a fixed cadence, independent of how
//! fast the network delivered it. The typewriter owns the pending
//! (received but not yet revealed) text and the Idle/Animating state;
//! the turn task drives ticks from its timer and applies each popped
//! word to the message's displayed content.

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No reveal in progress.
    #[default]
    Idle,
    /// A reveal tick is scheduled.
    Animating,
}

/// Word-at-a-time reveal queue for one stream session.
#[derive(Debug, Default)]
pub struct Typewriter {
    pending: String,
    state: PlaybackState,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == PlaybackState::Animating
    }

    /// Whether all enqueued text has been revealed.
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue a newly received fragment.
    ///
    /// Returns `true` if the typewriter was idle and playback must be
    /// (re)started, i.e. the first tick should fire immediately.
    pub fn enqueue(&mut self, fragment: &str) -> bool {
        self.pending.push_str(fragment);
        if self.state == PlaybackState::Idle && !self.pending.is_empty() {
            self.state = PlaybackState::Animating;
            return true;
        }
        false
    }

    /// One reveal tick: pop the next word off the queue.
    ///
    /// A word is the longest prefix that is either a run of
    /// non-whitespace followed by any trailing whitespace, or a run of
    /// pure whitespace. An empty queue at tick time transitions to
    /// Idle and yields nothing.
    pub fn tick(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            self.state = PlaybackState::Idle;
            return None;
        }

        let mut end = 0;
        let mut chars = self.pending.char_indices().peekable();
        let leading_ws = self.pending.chars().next().is_some_and(char::is_whitespace);
        // Non-whitespace run (skipped entirely for a whitespace word).
        if !leading_ws {
            while let Some(&(i, c)) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
        }
        // Trailing (or pure) whitespace run.
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }

        let rest = self.pending.split_off(end);
        let word = std::mem::replace(&mut self.pending, rest);
        Some(word)
    }

    /// Abandon whatever is still queued. Only an explicit cancellation
    /// may do this; stream end must keep draining on cadence instead.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.state = PlaybackState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn drain(tw: &mut Typewriter) -> Vec<String> {
        let mut words = Vec::new();
        while let Some(w) = tw.tick() {
            words.push(w);
        }
        words
    }

    #[test]
    fn test_word_includes_trailing_whitespace() {
        let mut tw = Typewriter::new();
        tw.enqueue("Hello world");
        assert_eq!(drain(&mut tw), vec!["Hello ", "world"]);
        assert_eq!(tw.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_pure_whitespace_is_one_word() {
        let mut tw = Typewriter::new();
        tw.enqueue("  \n\nnext");
        assert_eq!(drain(&mut tw), vec!["  \n\n", "next"]);
    }

    #[test]
    fn test_enqueue_signals_restart_only_when_idle() {
        let mut tw = Typewriter::new();
        assert!(tw.enqueue("a "));
        assert!(!tw.enqueue("b"));
        drain(&mut tw);
        assert!(tw.enqueue("c"));
    }

    #[test]
    fn test_concatenation_of_words_matches_input() {
        let mut tw = Typewriter::new();
        let text = "The  supply curve\tshifts,\n\nand price falls. é́ ok";
        tw.enqueue(text);
        assert_eq!(drain(&mut tw).concat(), text);
    }

    #[test]
    fn test_fragment_boundaries_do_not_split_words_eagerly() {
        // A fragment ending mid-word reveals the partial word; the next
        // fragment's head is a new word. The paced reveal never waits
        // for more network data.
        let mut tw = Typewriter::new();
        tw.enqueue("Hel");
        assert_eq!(tw.tick(), Some("Hel".to_string()));
        tw.enqueue("lo world");
        assert_eq!(drain(&mut tw), vec!["lo ", "world"]);
    }

    #[test]
    fn test_empty_tick_goes_idle() {
        let mut tw = Typewriter::new();
        tw.enqueue("hi");
        assert_eq!(tw.tick(), Some("hi".to_string()));
        assert!(tw.is_animating());
        assert_eq!(tw.tick(), None);
        assert_eq!(tw.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_cancel_abandons_queue() {
        let mut tw = Typewriter::new();
        tw.enqueue("never shown");
        tw.cancel();
        assert!(tw.is_drained());
        assert_eq!(tw.tick(), None);
    }
}
