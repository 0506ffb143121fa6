//! SSE (Server-Sent Events) streaming utilities
//!
//! Decodes the DuckDuckGo event feed and re-frames it as OpenAI
//! `chat.completion.chunk` events, or aggregates it into one completion.

pub mod decoder;
pub mod translate;

pub use decoder::{parse_line, DecoderState, StreamDecoder, UpstreamEvent};
pub use translate::{aggregate, format_error_event, format_sse_chunk, translate_stream};

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// SSE data arrives as byte chunks that may not align with line boundaries,
/// and a multi-byte UTF-8 character may be split between two chunks. Bytes
/// are therefore held back until a full line (ending with `\n`) is present
/// and only then decoded.
///
/// # Example
/// ```
/// use duckgate::streaming::SseLineBuffer;
///
/// let mut buffer = SseLineBuffer::new();
///
/// // First chunk contains partial line
/// let lines1 = buffer.feed(b"data: {\"message\":\"hel");
/// assert!(lines1.is_empty());
///
/// // Second chunk completes the line
/// let lines2 = buffer.feed(b"lo\"}\n");
/// assert_eq!(lines2, vec!["data: {\"message\":\"hello\"}"]);
/// ```
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes after the last newline seen so far
    incomplete: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            incomplete: Vec::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete lines.
    ///
    /// The newline is stripped from returned lines. Empty lines (the SSE
    /// event separator) are skipped. Incomplete trailing data is retained
    /// for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        let mut start = 0;

        // `\n` never occurs inside a multi-byte UTF-8 sequence, so every
        // slice cut here is a whole number of characters.
        while let Some(offset) = self.incomplete[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = &self.incomplete[start..end];
            if !line.is_empty() {
                complete_lines.push(String::from_utf8_lossy(line).into_owned());
            }
            start = end + 1;
        }

        self.incomplete.drain(..start);
        complete_lines
    }

    /// Check if there's any incomplete data remaining in the buffer.
    pub fn has_incomplete(&self) -> bool {
        !self.incomplete.is_empty()
    }

    /// Take the remaining incomplete data, leaving the buffer empty.
    ///
    /// Call this at end of stream to process a final unterminated line.
    pub fn take_remaining(&mut self) -> String {
        let rest = std::mem::take(&mut self.incomplete);
        String::from_utf8_lossy(&rest).into_owned()
    }
}
