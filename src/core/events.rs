//! Vendor-agnostic stream event model.
//!
//! Every speech vendor speaks its own event vocabulary over the wire; the
//! session controllers translate those into this closed set of variants so the
//! rest of the application never branches on vendor event names. Each variant
//! carries only the fields that are meaningful for it — an `Error` can never
//! smuggle a word list, a `Done` never carries text.

use std::fmt;

/// Default depth of the bounded queue used to hand events to callers.
///
/// Matches the backpressure window used for outbound audio: a slow consumer
/// stalls the inbound reader rather than growing an unbounded buffer.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// A single recognized word with its timing inside the utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    /// The word text as recognized (may include trailing punctuation).
    pub text: String,
    /// Start of the word, milliseconds from the beginning of the audio.
    pub begin_ms: u64,
    /// End of the word, milliseconds from the beginning of the audio.
    pub end_ms: u64,
}

/// A vendor-reported task failure: the vendor's error code plus its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorFailure {
    /// Vendor-specific error code (e.g. "40000001").
    pub code: String,
    /// Human-readable message supplied by the vendor.
    pub message: String,
}

impl VendorFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for VendorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Domain event emitted while a speech session is running.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An in-progress recognition segment; the text may still change.
    Partial {
        text: String,
        words: Vec<RecognizedWord>,
    },
    /// A completed recognition segment with its word list and, when the
    /// vendor reported usage, the audio duration consumed so far in seconds.
    Final {
        text: String,
        words: Vec<RecognizedWord>,
        duration_secs: Option<f64>,
    },
    /// The vendor failed the task. Terminal: no events follow.
    Error(VendorFailure),
    /// The vendor finished the task. Terminal: no events follow.
    Done,
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_) | StreamEvent::Done)
    }
}
