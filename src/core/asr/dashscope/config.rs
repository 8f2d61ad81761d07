//! Configuration for the DashScope recognition client.

use super::translator::FinalDetection;
use crate::core::providers::dashscope::{DASHSCOPE_WS_URL, protocol::MessagePayload};
use crate::core::session::SessionTimeouts;

/// Configuration for [`super::DashScopeAsr`].
#[derive(Debug, Clone)]
pub struct DashScopeAsrConfig {
    /// DashScope API key.
    pub api_key: String,
    /// WebSocket endpoint.
    pub ws_url: String,
    /// Recognition model.
    pub model: String,
    /// Audio container format sent to the vendor (e.g. "pcm", "wav").
    pub format: String,
    /// Sample rate of the input audio in Hz.
    pub sample_rate: u32,
    /// How final segments are detected in `result-generated` events; differs
    /// between protocol revisions.
    pub final_detection: FinalDetection,
    /// Session wait bounds.
    pub timeouts: SessionTimeouts,
}

impl Default for DashScopeAsrConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ws_url: DASHSCOPE_WS_URL.to_string(),
            model: "paraformer-realtime-v2".to_string(),
            format: "pcm".to_string(),
            sample_rate: 16000,
            final_detection: FinalDetection::default(),
            timeouts: SessionTimeouts::default(),
        }
    }
}

impl DashScopeAsrConfig {
    /// The `run-task` payload for one recognition session.
    pub(crate) fn run_task_payload(&self) -> MessagePayload {
        MessagePayload {
            task_group: Some("audio".to_string()),
            task: Some("asr".to_string()),
            function: Some("recognition".to_string()),
            model: Some(self.model.clone()),
            parameters: Some(serde_json::json!({
                "format": self.format,
                "sample_rate": self.sample_rate,
            })),
            input: Some(serde_json::json!({})),
            ..Default::default()
        }
    }
}
