//! One recognition session: one task over one connection.
//!
//! The controller sends `run-task`, waits for the acknowledgment, then runs
//! two activities concurrently until a terminal event: a pacer task that
//! releases audio chunks on a fixed cadence (emulating live capture) and the
//! inbound loop that forwards paced chunks to the socket and translates
//! vendor events. The pacer observes a cancellation token so a vendor
//! failure or caller cancellation stops outbound traffic promptly, and the
//! connection is closed exactly once on every exit path.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::DashScopeAsrConfig;
use super::translator::EventTranslator;
use crate::core::asr::base::AsrError;
use crate::core::audio::{ASR_CHUNK_BYTES, ASR_CHUNK_INTERVAL, chunk_audio};
use crate::core::events::StreamEvent;
use crate::core::providers::dashscope::auth;
use crate::core::providers::dashscope::protocol::{
    EVENT_TASK_FAILED, EVENT_TASK_STARTED, TaskMessage,
};
use crate::core::session::{SessionState, new_task_id, transition};
use crate::core::transport::{Frame, FrameSink, FrameSource, Transport, WsTransport};

/// Outbound units released by the pacer.
enum Outbound {
    Audio(Bytes),
    Finish(String),
}

/// Controller for one recognition task.
pub struct AsrSession<T: Transport = WsTransport> {
    config: DashScopeAsrConfig,
    transport: T,
    task_id: String,
    state: SessionState,
}

impl AsrSession<WsTransport> {
    /// Dial the vendor and prepare a session. The connection credential is
    /// built fresh for this attempt.
    pub async fn connect(config: DashScopeAsrConfig) -> Result<Self, AsrError> {
        let task_id = new_task_id();
        let mut state = SessionState::Idle;
        transition(&mut state, &task_id, SessionState::Connecting);

        let request = auth::build_ws_request(&config.ws_url, &config.api_key)?;
        let transport = WsTransport::connect(request).await?;

        Ok(Self {
            config,
            transport,
            task_id,
            state,
        })
    }
}

impl<T: Transport> AsrSession<T> {
    /// Build a session over an already-open transport.
    pub fn with_transport(config: DashScopeAsrConfig, transport: T) -> Self {
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

    /// Drive the task to completion, delivering events into `events`.
    ///
    /// The terminal `Done`/`Error` event is delivered after the connection
    /// has been torn down, so by the time the caller sees it no session
    /// resources remain.
    pub async fn run(self, audio: Bytes, events: mpsc::Sender<StreamEvent>) -> Result<(), AsrError> {
        let Self {
            config,
            transport,
            task_id,
            mut state,
        } = self;
        let (mut sink, mut source) = transport.into_split();
        let translator = EventTranslator::new(config.final_detection);
        let cancel = CancellationToken::new();
        let mut pacer = None;

        let result = async {
            // Open the task.
            let start = TaskMessage::run_task(&task_id, config.run_task_payload())
                .to_json()
                .map_err(|e| AsrError::Internal(format!("failed to encode run-task: {e}")))?;
            sink.send(Frame::Text(start)).await?;
            transition(&mut state, &task_id, SessionState::AwaitingStart);

            // No audio may leave before the vendor acknowledges the task.
            await_start(&task_id, &mut source, &config).await?;
            transition(&mut state, &task_id, SessionState::Streaming);

            let (chunk_tx, mut chunk_rx) = mpsc::channel(1);
            pacer = Some(tokio::spawn(pace_audio(
                audio,
                task_id.clone(),
                chunk_tx,
                cancel.child_token(),
            )));

            let mut outbound_open = true;
            loop {
                tokio::select! {
                    unit = chunk_rx.recv(), if outbound_open => match unit {
                        Some(Outbound::Audio(data)) => {
                            sink.send(Frame::Binary(data)).await?;
                        }
                        Some(Outbound::Finish(json)) => {
                            sink.send(Frame::Text(json)).await?;
                            transition(&mut state, &task_id, SessionState::AwaitingFinish);
                            outbound_open = false;
                        }
                        None => outbound_open = false,
                    },
                    inbound = timeout(config.timeouts.read, source.next_frame()) => {
                        let frame = inbound
                            .map_err(|_| AsrError::Timeout(format!(
                                "no vendor event within {:?}",
                                config.timeouts.read
                            )))??
                            .ok_or_else(|| AsrError::ConnectionFailed(
                                "connection closed mid-task".to_string(),
                            ))?;
                        let Frame::Text(text) = frame else {
                            debug!(%task_id, "ignoring unexpected binary frame");
                            continue;
                        };
                        let message = match TaskMessage::parse(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!(%task_id, "skipping malformed frame: {e}");
                                continue;
                            }
                        };
                        match translator.translate(&message) {
                            Some(StreamEvent::Done) => break Ok(()),
                            Some(StreamEvent::Error(failure)) => break Err(AsrError::Vendor {
                                code: failure.code,
                                message: failure.message,
                            }),
                            Some(event) => {
                                if events.send(event).await.is_err() {
                                    break Err(AsrError::Cancelled(
                                        "event receiver dropped".to_string(),
                                    ));
                                }
                            }
                            None => {}
                        }
                    }
                }
            }
        }
        .await;

        // Stop the pacer promptly; it must not hold the session open.
        cancel.cancel();
        if let Some(handle) = pacer {
            if let Err(e) = handle.await {
                warn!(%task_id, "pacer task failed: {e}");
            }
        }

        match &result {
            Ok(()) => transition(&mut state, &task_id, SessionState::Completed),
            Err(e) => {
                debug!(%task_id, "session failed: {e}");
                transition(&mut state, &task_id, SessionState::Failed);
            }
        }

        // Close exactly once, whichever path got us here.
        if let Err(e) = sink.close().await {
            debug!(%task_id, "close failed: {e}");
        }
        transition(&mut state, &task_id, SessionState::Closed);

        let terminal = match &result {
            Ok(()) => StreamEvent::Done,
            Err(e) => StreamEvent::Error(e.to_failure()),
        };
        let _ = events.send(terminal).await;

        result
    }
}

/// Wait for `task-started`, bounded by the configured start timeout.
async fn await_start<R: FrameSource>(
    task_id: &str,
    source: &mut R,
    config: &DashScopeAsrConfig,
) -> Result<(), AsrError> {
    let wait = config.timeouts.start;
    let ack = async {
        loop {
            match source.next_frame().await? {
                Some(Frame::Text(text)) => {
                    let message = match TaskMessage::parse(&text) {
                        Ok(message) => message,
                        Err(e) => {
                            warn!(%task_id, "skipping malformed frame: {e}");
                            continue;
                        }
                    };
                    match message.event() {
                        Some(EVENT_TASK_STARTED) => return Ok(()),
                        Some(EVENT_TASK_FAILED) => {
                            let failure = message.failure();
                            return Err(AsrError::Vendor {
                                code: failure.code,
                                message: failure.message,
                            });
                        }
                        other => debug!(%task_id, event = ?other, "ignoring pre-start frame"),
                    }
                }
                Some(Frame::Binary(_)) => debug!(%task_id, "ignoring binary frame before start"),
                None => {
                    return Err(AsrError::ConnectionFailed(
                        "connection closed before task-started".to_string(),
                    ));
                }
            }
        }
    };

    timeout(wait, ack)
        .await
        .map_err(|_| AsrError::Timeout(format!("no task-started within {wait:?}")))?
}

/// Release audio chunks on the capture cadence, then the finish command.
///
/// Stops at the next chunk boundary when cancelled; the finish command is
/// only sent after the last chunk, so an aborted session never finishes the
/// task.
async fn pace_audio(
    audio: Bytes,
    task_id: String,
    chunk_tx: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(ASR_CHUNK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for chunk in chunk_audio(&audio, ASR_CHUNK_BYTES) {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%task_id, "pacer cancelled before last chunk");
                return;
            }
            _ = ticker.tick() => {}
        }
        let data = Bytes::copy_from_slice(chunk.data);
        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = chunk_tx.send(Outbound::Audio(data)) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }

    let finish = match TaskMessage::finish_task(&task_id).to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(%task_id, "failed to encode finish-task: {e}");
            return;
        }
    };
    tokio::select! {
        _ = cancel.cancelled() => {}
        sent = chunk_tx.send(Outbound::Finish(finish)) => {
            if sent.is_err() {
                debug!(%task_id, "session ended before finish-task left the pacer");
            }
        }
    }
}
