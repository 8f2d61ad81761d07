//! Configuration for the DashScope synthesis client.

use std::time::Duration;

use crate::core::providers::dashscope::{DASHSCOPE_WS_URL, protocol::MessagePayload};
use crate::core::session::SessionTimeouts;
use crate::core::tts::base::SynthesisOptions;

/// Configuration for [`super::DashScopeTts`].
#[derive(Debug, Clone)]
pub struct DashScopeTtsConfig {
    /// DashScope API key.
    pub api_key: String,
    /// WebSocket endpoint.
    pub ws_url: String,
    /// Synthesis model.
    pub model: String,
    /// Defaults merged into caller-supplied options.
    pub defaults: SynthesisOptions,
    /// Session wait bounds. Synthesis of long text can take a while between
    /// frames, so the read deadline is looser than for recognition.
    pub timeouts: SessionTimeouts,
}

impl Default for DashScopeTtsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ws_url: DASHSCOPE_WS_URL.to_string(),
            model: "cosyvoice-v1".to_string(),
            defaults: SynthesisOptions::default(),
            timeouts: SessionTimeouts {
                start: Duration::from_secs(10),
                read: Duration::from_secs(60),
            },
        }
    }
}

impl DashScopeTtsConfig {
    /// The `run-task` payload for one synthesis session. `options` must
    /// already be merged and validated.
    pub(crate) fn run_task_payload(&self, options: &SynthesisOptions) -> MessagePayload {
        MessagePayload {
            task_group: Some("audio".to_string()),
            task: Some("tts".to_string()),
            function: Some("SpeechSynthesizer".to_string()),
            model: Some(self.model.clone()),
            parameters: Some(serde_json::json!({
                "text_type": "PlainText",
                "voice": options.voice,
                "format": options.format,
                "sample_rate": options.sample_rate,
                "volume": options.volume,
                "rate": options.rate,
                "pitch": options.pitch,
            })),
            input: Some(serde_json::json!({})),
            ..Default::default()
        }
    }
}
