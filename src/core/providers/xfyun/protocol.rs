//! The iFlytek ISE envelope.
//!
//! Requests are JSON text frames with three sections: `common` (app id, first
//! frame only), `business` (task parameters and the audio-position marker),
//! and `data` (frame status plus base64 audio). Responses carry a vendor
//! `code`/`message` pair and, on the final frame (`status == 2`), the
//! base64-encoded XML scoring document.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::audio::AudioChunk;
use crate::core::events::VendorFailure;

/// `data.status` values: first, continuation, last.
pub const AUDIO_STATUS_FIRST: u8 = 0;
pub const AUDIO_STATUS_CONTINUE: u8 = 1;
pub const AUDIO_STATUS_LAST: u8 = 2;

/// `business.aus` audio-position markers.
pub const AUS_FIRST: u8 = 1;
pub const AUS_MIDDLE: u8 = 2;
pub const AUS_LAST: u8 = 4;

/// Commands: parameter frame, audio frame.
pub const CMD_PARAMETERS: &str = "ssb";
pub const CMD_AUDIO: &str = "auw";

/// First-frame application identity.
#[derive(Debug, Clone, Serialize)]
pub struct CommonSection {
    pub app_id: String,
}

/// Task parameters and per-frame markers.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessSection {
    pub sub: String,
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttp_skip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aus: Option<u8>,
}

/// Frame status and audio payload.
#[derive(Debug, Clone, Serialize)]
pub struct DataSection {
    pub status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// One outbound frame.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<CommonSection>,
    pub business: BusinessSection,
    pub data: DataSection,
}

impl AssessmentRequest {
    /// The parameter frame that opens a task.
    ///
    /// The reference text is prefixed with a BOM; the engine uses it to
    /// detect the text encoding and rejects unprefixed text for some
    /// categories.
    pub fn parameters(app_id: &str, ent: &str, category: &str, text: &str) -> Self {
        Self {
            common: Some(CommonSection {
                app_id: app_id.to_string(),
            }),
            business: BusinessSection {
                sub: "ise".to_string(),
                cmd: CMD_PARAMETERS.to_string(),
                ent: Some(ent.to_string()),
                category: Some(category.to_string()),
                text: Some(format!("\u{feff}{text}")),
                tte: Some("utf-8".to_string()),
                ttp_skip: Some(true),
                aue: Some("raw".to_string()),
                auf: Some("audio/L16;rate=16000".to_string()),
                aus: None,
            },
            data: DataSection {
                status: AUDIO_STATUS_FIRST,
                data: None,
            },
        }
    }

    /// An audio frame. Position markers come straight from the chunk.
    pub fn audio(chunk: &AudioChunk<'_>) -> Self {
        let aus = if chunk.is_first {
            AUS_FIRST
        } else if chunk.is_last {
            AUS_LAST
        } else {
            AUS_MIDDLE
        };
        let status = if chunk.is_last {
            AUDIO_STATUS_LAST
        } else {
            AUDIO_STATUS_CONTINUE
        };

        Self {
            common: None,
            business: BusinessSection {
                sub: "ise".to_string(),
                cmd: CMD_AUDIO.to_string(),
                ent: None,
                category: None,
                text: None,
                tte: None,
                ttp_skip: None,
                aue: Some("raw".to_string()),
                auf: None,
                aus: Some(aus),
            },
            data: DataSection {
                status,
                data: Some(BASE64_STANDARD.encode(chunk.data)),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One inbound frame.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub data: Option<ResponseData>,
}

/// Result payload of an inbound frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    pub status: u8,
    #[serde(default)]
    pub data: String,
}

impl AssessmentResponse {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The vendor failure, if this frame reports one.
    pub fn failure(&self) -> Option<VendorFailure> {
        if self.code == 0 {
            None
        } else {
            Some(VendorFailure::new(self.code.to_string(), &self.message))
        }
    }

    /// Whether this frame carries the final scoring document.
    pub fn is_final(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| d.status == AUDIO_STATUS_LAST)
    }

    /// Decode the base64 scoring document on the final frame.
    pub fn decode_report(&self) -> Option<Vec<u8>> {
        self.data
            .as_ref()
            .and_then(|d| BASE64_STANDARD.decode(&d.data).ok())
    }
}
