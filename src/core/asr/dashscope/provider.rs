//! Recognition capability adapter over [`AsrSession`].

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::info;

use super::config::DashScopeAsrConfig;
use super::session::AsrSession;
use crate::core::asr::base::{AsrError, SpeechRecognizer, Transcription};
use crate::core::events::{EVENT_QUEUE_DEPTH, StreamEvent};

/// DashScope speech recognition provider.
///
/// Each call opens exactly one session; nothing is shared between calls.
pub struct DashScopeAsr {
    config: DashScopeAsrConfig,
}

impl DashScopeAsr {
    pub fn new(config: DashScopeAsrConfig) -> Result<Self, AsrError> {
        if config.api_key.is_empty() {
            return Err(AsrError::InvalidInput(
                "API key is required for DashScope recognition".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn call_config(&self, format: &str, sample_rate: u32) -> DashScopeAsrConfig {
        let mut config = self.config.clone();
        if !format.is_empty() {
            config.format = format.to_string();
        }
        if sample_rate > 0 {
            config.sample_rate = sample_rate;
        }
        config
    }

    fn check_audio(audio: &Bytes) -> Result<(), AsrError> {
        if audio.is_empty() {
            return Err(AsrError::InvalidInput("no audio to recognize".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechRecognizer for DashScopeAsr {
    async fn recognize(
        &self,
        audio: Bytes,
        format: &str,
        sample_rate: u32,
    ) -> Result<Transcription, AsrError> {
        Self::check_audio(&audio)?;

        let session = AsrSession::connect(self.call_config(format, sample_rate)).await?;
        let task_id = session.task_id().to_string();
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = tokio::spawn(session.run(audio, events_tx));

        let mut transcription = Transcription::default();
        while let Some(event) = events_rx.recv().await {
            match event {
                StreamEvent::Final {
                    text,
                    words,
                    duration_secs,
                } => {
                    if !transcription.text.is_empty() && !text.is_empty() {
                        transcription.text.push(' ');
                    }
                    transcription.text.push_str(&text);
                    transcription.words.extend(words);
                    if duration_secs.is_some() {
                        transcription.duration_secs = duration_secs;
                    }
                }
                StreamEvent::Partial { .. } => {}
                // Terminal outcomes are mirrored by the session's return
                // value, handled below.
                StreamEvent::Done | StreamEvent::Error(_) => {}
            }
        }

        handle
            .await
            .map_err(|e| AsrError::Internal(format!("session task failed: {e}")))??;

        info!(
            %task_id,
            chars = transcription.text.len(),
            words = transcription.words.len(),
            "recognition finished"
        );
        Ok(transcription)
    }

    async fn recognize_stream(
        &self,
        audio: Bytes,
        format: &str,
        sample_rate: u32,
    ) -> Result<mpsc::Receiver<StreamEvent>, AsrError> {
        Self::check_audio(&audio)?;

        let session = AsrSession::connect(self.call_config(format, sample_rate)).await?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        // Errors surface on the stream as a terminal Error event; dropping
        // the receiver cancels the session.
        tokio::spawn(session.run(audio, events_tx));
        Ok(events_rx)
    }
}
