//! Base types for speech-synthesis providers.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::transport::TransportError;

/// Error types for synthesis operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TtsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Synthesis vendor error {code}: {message}")]
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

impl From<TransportError> for TtsError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::ConnectionFailed(m) => TtsError::ConnectionFailed(m),
            TransportError::SendFailed(m) | TransportError::ReceiveFailed(m) => TtsError::Network(m),
        }
    }
}

/// Voice and audio shaping for one synthesis call.
///
/// Callers usually fill only what they care about; [`merged_with`] resolves
/// the rest from the configured defaults so the session never sees a
/// half-empty set. Zero and empty mean "unset".
///
/// [`merged_with`]: SynthesisOptions::merged_with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    /// Voice id.
    pub voice: String,
    /// Output audio container ("mp3", "wav", "pcm").
    pub format: String,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Loudness, 0–100.
    pub volume: u32,
    /// Speaking rate multiplier, 0.5–2.0.
    pub rate: f32,
    /// Pitch multiplier, 0.5–2.0.
    pub pitch: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            voice: "longxiaochun".to_string(),
            format: "mp3".to_string(),
            sample_rate: 22050,
            volume: 50,
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl SynthesisOptions {
    /// All fields unset; everything resolves from the defaults on merge.
    pub fn unset() -> Self {
        Self {
            voice: String::new(),
            format: String::new(),
            sample_rate: 0,
            volume: 0,
            rate: 0.0,
            pitch: 0.0,
        }
    }

    /// Fill every unset field from `defaults`.
    pub fn merged_with(&self, defaults: &SynthesisOptions) -> SynthesisOptions {
        SynthesisOptions {
            voice: if self.voice.is_empty() {
                defaults.voice.clone()
            } else {
                self.voice.clone()
            },
            format: if self.format.is_empty() {
                defaults.format.clone()
            } else {
                self.format.clone()
            },
            sample_rate: if self.sample_rate == 0 {
                defaults.sample_rate
            } else {
                self.sample_rate
            },
            volume: if self.volume == 0 {
                defaults.volume
            } else {
                self.volume
            },
            rate: if self.rate == 0.0 { defaults.rate } else { self.rate },
            pitch: if self.pitch == 0.0 {
                defaults.pitch
            } else {
                self.pitch
            },
        }
    }

    /// Range checks, applied after the merge.
    pub fn validate(&self) -> Result<(), TtsError> {
        if self.voice.is_empty() {
            return Err(TtsError::InvalidConfiguration("voice is empty".to_string()));
        }
        if self.format.is_empty() {
            return Err(TtsError::InvalidConfiguration("format is empty".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(TtsError::InvalidConfiguration(
                "sample rate is zero".to_string(),
            ));
        }
        if self.volume > 100 {
            return Err(TtsError::InvalidConfiguration(format!(
                "volume {} out of range 0-100",
                self.volume
            )));
        }
        if !(0.5..=2.0).contains(&self.rate) {
            return Err(TtsError::InvalidConfiguration(format!(
                "rate {} out of range 0.5-2.0",
                self.rate
            )));
        }
        if !(0.5..=2.0).contains(&self.pitch) {
            return Err(TtsError::InvalidConfiguration(format!(
                "pitch {} out of range 0.5-2.0",
                self.pitch
            )));
        }
        Ok(())
    }
}

/// Capability interface for speech synthesis.
///
/// Implementations open exactly one vendor session per call.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one text into a single audio buffer.
    async fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<Bytes, TtsError>;

    /// Synthesize several text segments in one session, concatenated into
    /// one audio buffer.
    async fn synthesize_many(
        &self,
        texts: &[String],
        options: &SynthesisOptions,
    ) -> Result<Bytes, TtsError>;

    /// Synthesize one text, surfacing audio chunks as they arrive. The
    /// channel closes after the last chunk; a failure arrives as a terminal
    /// `Err` item.
    async fn synthesize_streaming(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<mpsc::Receiver<Result<Bytes, TtsError>>, TtsError>;
}
