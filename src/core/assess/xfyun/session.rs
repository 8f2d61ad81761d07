//! One assessment session: one recording over one connection.
//!
//! Same shape as the recognition session — a pacer task releases audio on
//! the capture cadence while the inbound loop watches for the result — with
//! one protocol difference: ISE has no start acknowledgment. The parameter
//! frame is the start command, and the session is streaming as soon as it is
//! written; vendor errors arrive asynchronously on the inbound side.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, timeout};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::XfyunIseConfig;
use super::report::parse_report;
use crate::core::assess::base::{AssessError, AssessmentResult, Category};
use crate::core::audio::{ISE_CHUNK_BYTES, ISE_CHUNK_INTERVAL, chunk_audio};
use crate::core::providers::xfyun::auth::{rfc1123_date, signed_ws_url};
use crate::core::providers::xfyun::protocol::{AssessmentRequest, AssessmentResponse};
use crate::core::session::{SessionState, new_task_id, transition};
use crate::core::transport::{Frame, FrameSink, FrameSource, Transport, TransportError, WsTransport};

/// Outbound units released by the pacer.
enum Outbound {
    Audio(String),
    /// The marked last frame; doubles as the finish command.
    Last(String),
}

/// Controller for one assessment task.
pub struct IseSession<T: Transport = WsTransport> {
    config: XfyunIseConfig,
    transport: T,
    task_id: String,
    state: SessionState,
}

impl IseSession<WsTransport> {
    /// Dial the vendor. The URL signature embeds the current date, so it is
    /// regenerated on every attempt.
    pub async fn connect(config: XfyunIseConfig) -> Result<Self, AssessError> {
        let task_id = new_task_id();
        let mut state = SessionState::Idle;
        transition(&mut state, &task_id, SessionState::Connecting);

        let date = rfc1123_date();
        let url = signed_ws_url(&config.ws_url, &config.api_key, &config.api_secret, &date)?;
        let request = url
            .into_client_request()
            .map_err(|e| TransportError::ConnectionFailed(format!("invalid signed url: {e}")))
            .map_err(AssessError::from)?;
        let transport = WsTransport::connect(request).await?;

        Ok(Self {
            config,
            transport,
            task_id,
            state,
        })
    }
}

impl<T: Transport> IseSession<T> {
    /// Build a session over an already-open transport.
    pub fn with_transport(config: XfyunIseConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            task_id: new_task_id(),
            state: SessionState::Idle,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Stream the recording and wait for the scoring document.
    pub async fn run(
        self,
        reference_text: String,
        audio: Bytes,
        category: Category,
    ) -> Result<AssessmentResult, AssessError> {
        let Self {
            config,
            transport,
            task_id,
            mut state,
        } = self;
        let (mut sink, mut source) = transport.into_split();
        let cancel = CancellationToken::new();
        let mut pacer = None;

        let result = async {
            // The parameter frame opens the task; there is no acknowledgment
            // to wait for in this protocol.
            let parameters = AssessmentRequest::parameters(
                &config.app_id,
                &config.ent,
                category.wire_name(),
                &reference_text,
            )
            .to_json()
            .map_err(|e| AssessError::Internal(format!("failed to encode parameters: {e}")))?;
            sink.send(Frame::Text(parameters)).await?;
            transition(&mut state, &task_id, SessionState::Streaming);

            let (frame_tx, mut frame_rx) = mpsc::channel(1);
            pacer = Some(tokio::spawn(pace_audio(
                audio,
                task_id.clone(),
                frame_tx,
                cancel.child_token(),
            )));

            let mut outbound_open = true;
            loop {
                tokio::select! {
                    unit = frame_rx.recv(), if outbound_open => match unit {
                        Some(Outbound::Audio(json)) => {
                            sink.send(Frame::Text(json)).await?;
                        }
                        Some(Outbound::Last(json)) => {
                            sink.send(Frame::Text(json)).await?;
                            transition(&mut state, &task_id, SessionState::AwaitingFinish);
                            outbound_open = false;
                        }
                        None => outbound_open = false,
                    },
                    inbound = timeout(config.timeouts.read, source.next_frame()) => {
                        let frame = inbound
                            .map_err(|_| AssessError::Timeout(format!(
                                "no vendor frame within {:?}",
                                config.timeouts.read
                            )))??
                            .ok_or_else(|| AssessError::ConnectionFailed(
                                "connection closed mid-task".to_string(),
                            ))?;
                        let Frame::Text(text) = frame else {
                            debug!(%task_id, "ignoring unexpected binary frame");
                            continue;
                        };
                        let response = match AssessmentResponse::parse(&text) {
                            Ok(response) => response,
                            Err(e) => {
                                warn!(%task_id, "skipping malformed frame: {e}");
                                continue;
                            }
                        };
                        if let Some(failure) = response.failure() {
                            break Err(AssessError::Vendor {
                                code: failure.code,
                                message: failure.message,
                            });
                        }
                        if response.is_final() {
                            debug!(%task_id, sid = %response.sid, "scoring document received");
                            let report = response.decode_report().ok_or_else(|| {
                                AssessError::MalformedReport(
                                    "final frame carried undecodable base64".to_string(),
                                )
                            })?;
                            let xml = String::from_utf8_lossy(&report);
                            break parse_report(&xml, category);
                        }
                        // Progress frames (status 0/1) carry nothing we need.
                    }
                }
            }
        }
        .await;

        cancel.cancel();
        if let Some(handle) = pacer {
            if let Err(e) = handle.await {
                warn!(%task_id, "pacer task failed: {e}");
            }
        }

        match &result {
            Ok(_) => transition(&mut state, &task_id, SessionState::Completed),
            Err(e) => {
                debug!(%task_id, "session failed: {e}");
                transition(&mut state, &task_id, SessionState::Failed);
            }
        }

        if let Err(e) = sink.close().await {
            debug!(%task_id, "close failed: {e}");
        }
        transition(&mut state, &task_id, SessionState::Closed);

        result
    }
}

/// Release marked audio frames on the capture cadence. The last frame is
/// the finish command; a cancelled pacer never sends it.
async fn pace_audio(
    audio: Bytes,
    task_id: String,
    frame_tx: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(ISE_CHUNK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for chunk in chunk_audio(&audio, ISE_CHUNK_BYTES) {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%task_id, "pacer cancelled before last chunk");
                return;
            }
            _ = ticker.tick() => {}
        }
        let json = match AssessmentRequest::audio(&chunk).to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(%task_id, "failed to encode audio frame: {e}");
                return;
            }
        };
        let unit = if chunk.is_last {
            Outbound::Last(json)
        } else {
            Outbound::Audio(json)
        };
        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = frame_tx.send(unit) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}
