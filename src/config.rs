//! Engine configuration.
//!
//! Loaded from environment variables (with `.env` support), then turned
//! into the per-vendor configurations the providers consume. Missing
//! credentials only fail the capability that needs them, so a deployment
//! can run recognition without assessment keys and vice versa.

use std::env;

use crate::core::asr::{AsrError, DashScopeAsrConfig, FinalDetection};
use crate::core::assess::{AssessError, XfyunIseConfig};
use crate::core::providers::dashscope::DASHSCOPE_WS_URL;
use crate::core::providers::xfyun::ISE_WS_URL;
use crate::core::tts::{DashScopeTtsConfig, SynthesisOptions, TtsError};

/// Configuration for the speech engine.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    // DashScope (recognition + synthesis)
    pub dashscope_api_key: Option<String>,
    pub dashscope_ws_url: String,
    pub asr_model: String,
    pub asr_final_detection: FinalDetection,
    pub tts_model: String,
    pub tts_defaults: SynthesisOptions,

    // iFlytek (assessment)
    pub xfyun_app_id: Option<String>,
    pub xfyun_api_key: Option<String>,
    pub xfyun_api_secret: Option<String>,
    pub xfyun_ws_url: String,
}

impl SpeechConfig {
    /// Load configuration from environment variables, with sensible
    /// defaults. Also loads from a `.env` file if present.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let _ = dotenvy::dotenv();

        let dashscope_api_key = env::var("DASHSCOPE_API_KEY").ok().filter(|v| !v.is_empty());
        let dashscope_ws_url =
            env::var("DASHSCOPE_WS_URL").unwrap_or_else(|_| DASHSCOPE_WS_URL.to_string());
        let asr_model =
            env::var("ASR_MODEL").unwrap_or_else(|_| "paraformer-realtime-v2".to_string());
        let asr_final_detection = match env::var("ASR_FINAL_DETECTION").ok().as_deref() {
            None | Some("") | Some("sentence_end") => FinalDetection::SentenceEndFlag,
            Some("end_time") => FinalDetection::EndTimePresent,
            Some(other) => {
                return Err(format!(
                    "Invalid ASR_FINAL_DETECTION: {other} (expected sentence_end or end_time)"
                )
                .into());
            }
        };
        let tts_model = env::var("TTS_MODEL").unwrap_or_else(|_| "cosyvoice-v1".to_string());

        let mut tts_defaults = SynthesisOptions::default();
        if let Ok(voice) = env::var("TTS_VOICE") {
            if !voice.is_empty() {
                tts_defaults.voice = voice;
            }
        }
        if let Ok(format) = env::var("TTS_FORMAT") {
            if !format.is_empty() {
                tts_defaults.format = format;
            }
        }
        if let Ok(rate) = env::var("TTS_SAMPLE_RATE") {
            tts_defaults.sample_rate = rate
                .parse()
                .map_err(|e| format!("Invalid TTS_SAMPLE_RATE: {e}"))?;
        }

        let xfyun_app_id = env::var("XFYUN_APP_ID").ok().filter(|v| !v.is_empty());
        let xfyun_api_key = env::var("XFYUN_API_KEY").ok().filter(|v| !v.is_empty());
        let xfyun_api_secret = env::var("XFYUN_API_SECRET").ok().filter(|v| !v.is_empty());
        let xfyun_ws_url = env::var("XFYUN_ISE_URL").unwrap_or_else(|_| ISE_WS_URL.to_string());

        Ok(Self {
            dashscope_api_key,
            dashscope_ws_url,
            asr_model,
            asr_final_detection,
            tts_model,
            tts_defaults,
            xfyun_app_id,
            xfyun_api_key,
            xfyun_api_secret,
            xfyun_ws_url,
        })
    }

    /// Recognition configuration; fails if the DashScope key is missing.
    pub fn recognizer_config(&self) -> Result<DashScopeAsrConfig, AsrError> {
        let api_key = self.dashscope_api_key.clone().ok_or_else(|| {
            AsrError::InvalidInput("DASHSCOPE_API_KEY is not set".to_string())
        })?;
        Ok(DashScopeAsrConfig {
            api_key,
            ws_url: self.dashscope_ws_url.clone(),
            model: self.asr_model.clone(),
            final_detection: self.asr_final_detection,
            ..Default::default()
        })
    }

    /// Synthesis configuration; fails if the DashScope key is missing.
    pub fn synthesizer_config(&self) -> Result<DashScopeTtsConfig, TtsError> {
        let api_key = self.dashscope_api_key.clone().ok_or_else(|| {
            TtsError::InvalidConfiguration("DASHSCOPE_API_KEY is not set".to_string())
        })?;
        Ok(DashScopeTtsConfig {
            api_key,
            ws_url: self.dashscope_ws_url.clone(),
            model: self.tts_model.clone(),
            defaults: self.tts_defaults.clone(),
            ..Default::default()
        })
    }

    /// Assessment configuration; fails if any iFlytek credential is missing.
    pub fn assessor_config(&self) -> Result<XfyunIseConfig, AssessError> {
        let (app_id, api_key, api_secret) = match (
            self.xfyun_app_id.clone(),
            self.xfyun_api_key.clone(),
            self.xfyun_api_secret.clone(),
        ) {
            (Some(app_id), Some(api_key), Some(api_secret)) => (app_id, api_key, api_secret),
            _ => {
                return Err(AssessError::InvalidInput(
                    "XFYUN_APP_ID, XFYUN_API_KEY and XFYUN_API_SECRET must all be set"
                        .to_string(),
                ));
            }
        };
        Ok(XfyunIseConfig {
            app_id,
            api_key,
            api_secret,
            ws_url: self.xfyun_ws_url.clone(),
            ..Default::default()
        })
    }
}
