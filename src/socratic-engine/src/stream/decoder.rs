//! Frame decoder.
//!
//! Turns arbitrarily-sized network chunks into complete logical
//! records (lines). A record may be split anywhere by the transport,
//! including in the middle of a multi-byte UTF-8 sequence, so the
//! buffer holds raw bytes and text is only materialised once a
//! newline boundary is seen.

/// Decodes newline-delimited records out of a chunked byte stream.
///
/// One decoder serves exactly one stream session; state is not
/// reusable across turns.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an incoming chunk. An empty chunk is a no-op.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete record, skipping keep-alives.
    ///
    /// A record runs up to the next newline; a single trailing
    /// carriage return is stripped. Empty records and comment records
    /// (leading `:`) are discarded silently. Returns `None` once the
    /// buffer no longer contains a complete record; the unterminated
    /// tail stays buffered for the next chunk.
    pub fn next_record(&mut self) -> Option<String> {
        loop {
            let pos = self.buf.iter().position(|&b| b == b'\n')?;
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() || line.first() == Some(&b':') {
                continue;
            }
            return Some(String::from_utf8_lossy(&line).into_owned());
        }
    }

    /// Re-join an undecodable record with whatever came after it.
    ///
    /// Used when a record's JSON payload turned out to be incomplete
    /// because the wire's line boundary fell inside a JSON string
    /// value; the record is glued back onto the front of the buffer
    /// (without a separator) and re-extracted on a later pass once
    /// more text has arrived.
    pub fn rebuffer(&mut self, record: &str) {
        let mut joined = Vec::with_capacity(record.len() + self.buf.len());
        joined.extend_from_slice(record.as_bytes());
        joined.extend_from_slice(&self.buf);
        self.buf = joined;
    }

    /// The unterminated tail carried over between chunk arrivals.
    pub fn remainder(&self) -> &[u8] {
        &self.buf
    }
}
