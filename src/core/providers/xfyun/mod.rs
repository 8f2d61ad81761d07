//! Shared plumbing for the iFlytek (xfyun) open platform.
//!
//! The assessment client connects through a query-signed URL and speaks the
//! `common`/`business`/`data` envelope; both pieces live here.

pub mod auth;
pub mod protocol;

pub use auth::{ISE_WS_URL, rfc1123_date, signed_ws_url};
pub use protocol::{
    AUDIO_STATUS_CONTINUE, AUDIO_STATUS_FIRST, AUDIO_STATUS_LAST, AssessmentRequest,
    AssessmentResponse, BusinessSection, CommonSection, DataSection, ResponseData,
};
