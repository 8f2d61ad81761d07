//! One synthesis session: one task over one connection.
//!
//! Structure mirrors the recognition session: `run-task`, bounded wait for
//! the acknowledgment, then a pacer task feeding `continue-task` segments
//! while the inbound loop collects binary audio, and a single close on every
//! exit path. Text segments need no capture-rate emulation, so the pacer
//! releases them back-to-back.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::DashScopeTtsConfig;
use crate::core::providers::dashscope::auth;
use crate::core::providers::dashscope::protocol::{
    EVENT_TASK_FAILED, EVENT_TASK_FINISHED, EVENT_TASK_STARTED, TaskMessage,
};
use crate::core::session::{SessionState, new_task_id, transition};
use crate::core::transport::{Frame, FrameSink, FrameSource, Transport, WsTransport};
use crate::core::tts::base::{SynthesisOptions, TtsError};

/// Outbound units released by the pacer.
enum Outbound {
    Continue(String),
    Finish(String),
}

/// Controller for one synthesis task.
pub struct TtsSession<T: Transport = WsTransport> {
    config: DashScopeTtsConfig,
    options: SynthesisOptions,
    transport: T,
    task_id: String,
    state: SessionState,
}

impl TtsSession<WsTransport> {
    /// Dial the vendor with a fresh credential. `options` must already be
    /// merged against the configured defaults.
    pub async fn connect(
        config: DashScopeTtsConfig,
        options: SynthesisOptions,
    ) -> Result<Self, TtsError> {
        let task_id = new_task_id();
        let mut state = SessionState::Idle;
        transition(&mut state, &task_id, SessionState::Connecting);

        let request = auth::build_ws_request(&config.ws_url, &config.api_key)?;
        let transport = WsTransport::connect(request).await?;

        Ok(Self {
            config,
            options,
            transport,
            task_id,
            state,
        })
    }
}

impl<T: Transport> TtsSession<T> {
    /// Build a session over an already-open transport.
    pub fn with_transport(
        config: DashScopeTtsConfig,
        options: SynthesisOptions,
        transport: T,
    ) -> Self {
        Self {
            config,
            options,
            transport,
            task_id: new_task_id(),
            state: SessionState::Idle,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Synthesize `segments` in order, delivering audio chunks into
    /// `audio`. Several segments concatenate into one output stream. A
    /// failure is delivered as a terminal `Err` item after teardown.
    pub async fn run(
        self,
        segments: Vec<String>,
        audio: mpsc::Sender<Result<Bytes, TtsError>>,
    ) -> Result<(), TtsError> {
        let Self {
            config,
            options,
            transport,
            task_id,
            mut state,
        } = self;
        let (mut sink, mut source) = transport.into_split();
        let cancel = CancellationToken::new();
        let mut pacer = None;

        let result = async {
            let start = TaskMessage::run_task(&task_id, config.run_task_payload(&options))
                .to_json()
                .map_err(|e| TtsError::Internal(format!("failed to encode run-task: {e}")))?;
            sink.send(Frame::Text(start)).await?;
            transition(&mut state, &task_id, SessionState::AwaitingStart);

            await_start(&task_id, &mut source, &config).await?;
            transition(&mut state, &task_id, SessionState::Streaming);

            let (segment_tx, mut segment_rx) = mpsc::channel(1);
            pacer = Some(tokio::spawn(feed_segments(
                segments,
                task_id.clone(),
                segment_tx,
                cancel.child_token(),
            )));

            let mut outbound_open = true;
            loop {
                tokio::select! {
                    unit = segment_rx.recv(), if outbound_open => match unit {
                        Some(Outbound::Continue(json)) => {
                            sink.send(Frame::Text(json)).await?;
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
                            .map_err(|_| TtsError::Timeout(format!(
                                "no vendor frame within {:?}",
                                config.timeouts.read
                            )))??
                            .ok_or_else(|| TtsError::ConnectionFailed(
                                "connection closed mid-task".to_string(),
                            ))?;
                        match frame {
                            Frame::Binary(data) => {
                                if audio.send(Ok(data)).await.is_err() {
                                    break Err(TtsError::Cancelled(
                                        "audio receiver dropped".to_string(),
                                    ));
                                }
                            }
                            Frame::Text(text) => {
                                let message = match TaskMessage::parse(&text) {
                                    Ok(message) => message,
                                    Err(e) => {
                                        warn!(%task_id, "skipping malformed frame: {e}");
                                        continue;
                                    }
                                };
                                match message.event() {
                                    Some(EVENT_TASK_FINISHED) => break Ok(()),
                                    Some(EVENT_TASK_FAILED) => {
                                        let failure = message.failure();
                                        break Err(TtsError::Vendor {
                                            code: failure.code,
                                            message: failure.message,
                                        });
                                    }
                                    other => {
                                        debug!(%task_id, event = ?other, "ignoring vendor event");
                                    }
                                }
                            }
                        }
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
            Ok(()) => transition(&mut state, &task_id, SessionState::Completed),
            Err(e) => {
                debug!(%task_id, "session failed: {e}");
                transition(&mut state, &task_id, SessionState::Failed);
            }
        }

        if let Err(e) = sink.close().await {
            debug!(%task_id, "close failed: {e}");
        }
        transition(&mut state, &task_id, SessionState::Closed);

        if let Err(e) = &result {
            let _ = audio.send(Err(e.clone())).await;
        }

        result
    }
}

/// Wait for `task-started`, bounded by the configured start timeout.
async fn await_start<R: FrameSource>(
    task_id: &str,
    source: &mut R,
    config: &DashScopeTtsConfig,
) -> Result<(), TtsError> {
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
                            return Err(TtsError::Vendor {
                                code: failure.code,
                                message: failure.message,
                            });
                        }
                        other => debug!(%task_id, event = ?other, "ignoring pre-start frame"),
                    }
                }
                Some(Frame::Binary(_)) => debug!(%task_id, "ignoring binary frame before start"),
                None => {
                    return Err(TtsError::ConnectionFailed(
                        "connection closed before task-started".to_string(),
                    ));
                }
            }
        }
    };

    timeout(wait, ack)
        .await
        .map_err(|_| TtsError::Timeout(format!("no task-started within {wait:?}")))?
}

/// Release each text segment as one continue command, then the finish
/// command. Stops between segments when cancelled; an aborted session never
/// finishes the task.
async fn feed_segments(
    segments: Vec<String>,
    task_id: String,
    segment_tx: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
) {
    for segment in &segments {
        let json = match TaskMessage::continue_task(&task_id, serde_json::json!({"text": segment}))
            .to_json()
        {
            Ok(json) => json,
            Err(e) => {
                warn!(%task_id, "failed to encode continue-task: {e}");
                return;
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%task_id, "pacer cancelled before last segment");
                return;
            }
            sent = segment_tx.send(Outbound::Continue(json)) => {
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
        sent = segment_tx.send(Outbound::Finish(finish)) => {
            if sent.is_err() {
                debug!(%task_id, "session ended before finish-task left the pacer");
            }
        }
    }
}
