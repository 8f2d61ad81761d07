//! Base types for speech-recognition providers.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::core::events::{RecognizedWord, StreamEvent, VendorFailure};
use crate::core::transport::TransportError;

/// Error types for recognition operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AsrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Recognition vendor error {code}: {message}")]
    Vendor { code: String, message: String },
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Cancelled: {0}")]
    Cancelled(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransportError> for AsrError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::ConnectionFailed(m) => AsrError::ConnectionFailed(m),
            TransportError::SendFailed(m) | TransportError::ReceiveFailed(m) => AsrError::Network(m),
        }
    }
}

impl AsrError {
    /// The failure to report on the event stream for this error.
    pub(crate) fn to_failure(&self) -> VendorFailure {
        match self {
            AsrError::Vendor { code, message } => VendorFailure::new(code.clone(), message.clone()),
            other => VendorFailure::new("client", other.to_string()),
        }
    }
}

/// A finished recognition: all final segments joined, in spoken order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    /// Full recognized text.
    pub text: String,
    /// Word-level results across all segments, in spoken order.
    pub words: Vec<RecognizedWord>,
    /// Audio duration consumed, in seconds, when the vendor reported it.
    pub duration_secs: Option<f64>,
}

/// Capability interface for speech recognition.
///
/// Implementations open exactly one vendor session per call; nothing is
/// shared or reused between calls.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize a complete utterance, returning once the vendor finishes.
    async fn recognize(
        &self,
        audio: Bytes,
        format: &str,
        sample_rate: u32,
    ) -> Result<Transcription, AsrError>;

    /// Recognize an utterance, surfacing partial and final events as they
    /// arrive. The stream ends with a terminal `Done` or `Error` event.
    async fn recognize_stream(
        &self,
        audio: Bytes,
        format: &str,
        sample_rate: u32,
    ) -> Result<mpsc::Receiver<StreamEvent>, AsrError>;
}
