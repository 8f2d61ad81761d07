//! iFlytek connection signing.
//!
//! The platform authenticates the WebSocket handshake itself: the client
//! signs a canonical description of the upgrade request with HMAC-SHA256 and
//! passes the result as query parameters. Signatures embed the request date,
//! so a fresh one must be computed for every connection attempt — reusing
//! yesterday's URL yields a 401 from the gateway, not a protocol error.

use base64::prelude::*;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::core::transport::TransportError;

type HmacSha256 = Hmac<Sha256>;

/// Default pronunciation-assessment endpoint.
pub const ISE_WS_URL: &str = "wss://ise-api.xfyun.cn/v2/open-ise";

/// Current time in the RFC-1123 form the gateway expects.
pub fn rfc1123_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The canonical string covered by the signature.
fn canonical_request(host: &str, path: &str, date: &str) -> String {
    format!("host: {host}\ndate: {date}\nGET {path} HTTP/1.1")
}

/// Build a signed connection URL for `ws_url`.
///
/// Pure with respect to its inputs: the same key, secret and date always
/// produce the same URL. Callers pass a fresh [`rfc1123_date`] per attempt.
pub fn signed_ws_url(
    ws_url: &str,
    api_key: &str,
    api_secret: &str,
    date: &str,
) -> Result<String, TransportError> {
    let mut url = Url::parse(ws_url)
        .map_err(|e| TransportError::ConnectionFailed(format!("invalid endpoint {ws_url}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| {
            TransportError::ConnectionFailed(format!("endpoint {ws_url} has no host"))
        })?
        .to_string();
    let path = url.path().to_string();

    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| TransportError::ConnectionFailed(format!("invalid signing secret: {e}")))?;
    mac.update(canonical_request(&host, &path, date).as_bytes());
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    let descriptor = format!(
        "api_key=\"{api_key}\", algorithm=\"hmac-sha256\", \
         headers=\"host date request-line\", signature=\"{signature}\""
    );
    let authorization = BASE64_STANDARD.encode(descriptor);

    url.query_pairs_mut()
        .append_pair("authorization", &authorization)
        .append_pair("date", date)
        .append_pair("host", &host);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "Fri, 08 Aug 2025 08:00:00 GMT";

    #[test]
    fn test_canonical_request_shape() {
        let canonical = canonical_request("ise-api.xfyun.cn", "/v2/open-ise", DATE);
        assert_eq!(
            canonical,
            "host: ise-api.xfyun.cn\ndate: Fri, 08 Aug 2025 08:00:00 GMT\nGET /v2/open-ise HTTP/1.1"
        );
    }

    #[test]
    fn test_signed_url_carries_expected_parameters() {
        let signed = signed_ws_url(ISE_WS_URL, "key123", "secret456", DATE).unwrap();
        let url = Url::parse(&signed).unwrap();

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["host"], "ise-api.xfyun.cn");
        assert_eq!(pairs["date"], DATE);

        // The authorization parameter is a base64 descriptor naming the key,
        // the algorithm and the signed headers.
        let descriptor =
            String::from_utf8(BASE64_STANDARD.decode(&pairs["authorization"]).unwrap()).unwrap();
        assert!(descriptor.contains("api_key=\"key123\""));
        assert!(descriptor.contains("algorithm=\"hmac-sha256\""));
        assert!(descriptor.contains("headers=\"host date request-line\""));
        assert!(descriptor.contains("signature=\""));
    }

    #[test]
    fn test_signature_is_deterministic_per_date() {
        let a = signed_ws_url(ISE_WS_URL, "key", "secret", DATE).unwrap();
        let b = signed_ws_url(ISE_WS_URL, "key", "secret", DATE).unwrap();
        assert_eq!(a, b);

        let other = signed_ws_url(
            ISE_WS_URL,
            "key",
            "secret",
            "Sat, 09 Aug 2025 08:00:00 GMT",
        )
        .unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_secret_changes_signature() {
        let a = signed_ws_url(ISE_WS_URL, "key", "secret-a", DATE).unwrap();
        let b = signed_ws_url(ISE_WS_URL, "key", "secret-b", DATE).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rfc1123_date_shape() {
        let date = rfc1123_date();
        assert!(date.ends_with(" GMT"));
        // "Fri, 08 Aug 2025 08:00:00 GMT"
        assert_eq!(date.len(), 29);
    }
}
