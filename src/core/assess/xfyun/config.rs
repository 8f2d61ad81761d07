//! Configuration for the ISE assessment client.

use crate::core::providers::xfyun::ISE_WS_URL;
use crate::core::session::SessionTimeouts;

/// Configuration for [`super::XfyunAssessor`].
#[derive(Debug, Clone)]
pub struct XfyunIseConfig {
    /// iFlytek application id.
    pub app_id: String,
    /// API key used in the signed URL.
    pub api_key: String,
    /// API secret the signature is computed with.
    pub api_secret: String,
    /// WebSocket endpoint.
    pub ws_url: String,
    /// Evaluation engine ("en_vip" for English).
    pub ent: String,
    /// Session wait bounds.
    pub timeouts: SessionTimeouts,
}

impl Default for XfyunIseConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            ws_url: ISE_WS_URL.to_string(),
            ent: "en_vip".to_string(),
            timeouts: SessionTimeouts::default(),
        }
    }
}

impl XfyunIseConfig {
    /// Whether all credential fields are present.
    pub fn has_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}
