//! Upstream event decoding
//!
//! DuckDuckGo answers with `data: <json>` lines. Each line is either a message
//! fragment, an in-band error object, or the `[DONE]` sentinel. Anything else
//! (keep-alives, malformed JSON, unknown shapes) is dropped.

use serde_json::Value;

use super::SseLineBuffer;

/// Prefix of every meaningful line
pub const DATA_PREFIX: &str = "data: ";

/// End-of-stream sentinel payload
pub const DONE_SENTINEL: &str = "[DONE]";

/// Status reported when an in-band error carries none
const DEFAULT_ERROR_STATUS: u16 = 500;

/// A decoded upstream line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// Incremental assistant text
    Fragment(String),
    /// In-band error object (`"action": "error"`)
    Error { status: u16, error_type: String },
    /// `[DONE]`, or the synthetic end emitted when the upstream just closes
    Done,
}

/// Decode one complete line.
///
/// Returns `None` for lines that carry nothing: blanks, non-data lines,
/// unparsable JSON and payloads without a message. Any JSON object with
/// `"action": "error"` is an error event, whatever the types of its other
/// fields.
pub fn parse_line(line: &str) -> Option<UpstreamEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    if payload == DONE_SENTINEL {
        return Some(UpstreamEvent::Done);
    }

    let payload: Value = serde_json::from_str(payload).ok()?;

    if payload.get("action").and_then(Value::as_str) == Some("error") {
        return Some(UpstreamEvent::Error {
            status: payload
                .get("status")
                .and_then(error_status)
                .unwrap_or(DEFAULT_ERROR_STATUS),
            error_type: payload
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(|message| UpstreamEvent::Fragment(message.to_string()))
}

/// Status of an in-band error: an integer, a whole float or a numeric string
/// that fits in `u16`
fn error_status(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decoder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for more bytes
    Open,
    /// A `Done` event has been emitted
    Finished,
    /// An `Error` event has been emitted
    Errored,
}

/// Incremental decoder for the upstream byte stream.
///
/// Bytes go in through [`feed`](Self::feed) as they arrive; the carry-over of
/// an unterminated line is kept between calls. Once `Done` or `Error` has been
/// produced the decoder is terminated and ignores further input.
/// [`finish`](Self::finish) must be called when the upstream closes, and
/// guarantees the event sequence ends with exactly one `Done` unless an
/// error ended it first.
#[derive(Debug)]
pub struct StreamDecoder {
    buffer: SseLineBuffer,
    state: DecoderState,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            buffer: SseLineBuffer::new(),
            state: DecoderState::Open,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state != DecoderState::Open
    }

    /// Feed a chunk of bytes and return the events it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<UpstreamEvent> {
        let mut events = Vec::new();
        if self.is_terminated() {
            return events;
        }

        for line in self.buffer.feed(bytes) {
            if let Some(event) = parse_line(&line) {
                self.push(event, &mut events);
                if self.is_terminated() {
                    break;
                }
            }
        }

        events
    }

    /// Signal end of input.
    ///
    /// A trailing unterminated line is decoded under the same rules as any
    /// other line, then a `Done` is appended if the stream is still open.
    pub fn finish(&mut self) -> Vec<UpstreamEvent> {
        let mut events = Vec::new();
        if self.is_terminated() {
            return events;
        }

        let rest = self.buffer.take_remaining();
        if let Some(event) = parse_line(&rest) {
            self.push(event, &mut events);
        }

        if !self.is_terminated() {
            self.push(UpstreamEvent::Done, &mut events);
        }

        events
    }

    fn push(&mut self, event: UpstreamEvent, events: &mut Vec<UpstreamEvent>) {
        match event {
            UpstreamEvent::Done => self.state = DecoderState::Finished,
            UpstreamEvent::Error { .. } => self.state = DecoderState::Errored,
            UpstreamEvent::Fragment(_) => {}
        }
        events.push(event);
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
