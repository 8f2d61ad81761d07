//! DashScope connection authentication.
//!
//! DashScope uses a static bearer credential carried in the `Authorization`
//! header of the WebSocket upgrade request. Note the lowercase `bearer` —
//! the gateway rejects the capitalized form.

use tokio_tungstenite::tungstenite::handshake::client::{Request, generate_key};
use url::Url;

use crate::core::transport::TransportError;

/// Default DashScope streaming-inference endpoint.
pub const DASHSCOPE_WS_URL: &str = "wss://dashscope.aliyuncs.com/api-ws/v1/inference";

/// Build the `Authorization` header value for an API key.
#[inline]
pub fn bearer_header(api_key: &str) -> String {
    format!("bearer {api_key}")
}

/// Build the authenticated WebSocket upgrade request for `ws_url`.
pub fn build_ws_request(ws_url: &str, api_key: &str) -> Result<Request, TransportError> {
    let url = Url::parse(ws_url)
        .map_err(|e| TransportError::ConnectionFailed(format!("invalid endpoint {ws_url}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| {
            TransportError::ConnectionFailed(format!("endpoint {ws_url} has no host"))
        })?
        .to_string();

    Request::builder()
        .method("GET")
        .uri(ws_url)
        .header("Host", host)
        .header("Upgrade", "websocket")
        .header("Connection", "upgrade")
        .header("Sec-WebSocket-Key", generate_key())
        .header("Sec-WebSocket-Version", "13")
        .header("Authorization", bearer_header(api_key))
        .header("X-DashScope-DataInspection", "enable")
        .body(())
        .map_err(|e| {
            TransportError::ConnectionFailed(format!("failed to build upgrade request: {e}"))
        })
}
