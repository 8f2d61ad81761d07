//! Synthesis capability adapter over [`TtsSession`].

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tracing::info;

use super::config::DashScopeTtsConfig;
use super::session::TtsSession;
use crate::core::events::EVENT_QUEUE_DEPTH;
use crate::core::tts::base::{SpeechSynthesizer, SynthesisOptions, TtsError};

/// DashScope speech synthesis provider.
///
/// Each call opens exactly one session; nothing is shared between calls.
pub struct DashScopeTts {
    config: DashScopeTtsConfig,
}

impl DashScopeTts {
    pub fn new(config: DashScopeTtsConfig) -> Result<Self, TtsError> {
        if config.api_key.is_empty() {
            return Err(TtsError::InvalidConfiguration(
                "API key is required for DashScope synthesis".to_string(),
            ));
        }
        config.defaults.validate()?;
        Ok(Self { config })
    }

    /// Merge caller options against the configured defaults and validate
    /// the result, so the session never sees a half-empty set.
    fn resolve_options(&self, options: &SynthesisOptions) -> Result<SynthesisOptions, TtsError> {
        let merged = options.merged_with(&self.config.defaults);
        merged.validate()?;
        Ok(merged)
    }

    async fn run_session(
        &self,
        segments: Vec<String>,
        options: &SynthesisOptions,
    ) -> Result<Bytes, TtsError> {
        let options = self.resolve_options(options)?;
        let session = TtsSession::connect(self.config.clone(), options).await?;
        let task_id = session.task_id().to_string();
        let (audio_tx, mut audio_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = tokio::spawn(session.run(segments, audio_tx));

        let mut buffer = BytesMut::new();
        while let Some(item) = audio_rx.recv().await {
            match item {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                // The session's return value carries the error, below.
                Err(_) => break,
            }
        }
        handle
            .await
            .map_err(|e| TtsError::Internal(format!("session task failed: {e}")))??;

        info!(%task_id, bytes = buffer.len(), "synthesis finished");
        Ok(buffer.freeze())
    }
}

#[async_trait]
impl SpeechSynthesizer for DashScopeTts {
    async fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<Bytes, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::InvalidInput("no text to synthesize".to_string()));
        }
        self.run_session(vec![text.to_string()], options).await
    }

    async fn synthesize_many(
        &self,
        texts: &[String],
        options: &SynthesisOptions,
    ) -> Result<Bytes, TtsError> {
        if texts.is_empty() {
            return Err(TtsError::InvalidInput("no text to synthesize".to_string()));
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(TtsError::InvalidInput(
                "empty text segment in synthesis batch".to_string(),
            ));
        }
        self.run_session(texts.to_vec(), options).await
    }

    async fn synthesize_streaming(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<mpsc::Receiver<Result<Bytes, TtsError>>, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::InvalidInput("no text to synthesize".to_string()));
        }
        let options = self.resolve_options(options)?;
        let session = TtsSession::connect(self.config.clone(), options).await?;
        let (audio_tx, audio_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        // Errors surface on the stream as a terminal Err item; dropping the
        // receiver cancels the session.
        tokio::spawn(session.run(vec![text.to_string()], audio_tx));
        Ok(audio_rx)
    }
}
