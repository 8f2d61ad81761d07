//! Shared session lifecycle vocabulary.
//!
//! Each vendor client owns one physical connection for the lifetime of one
//! task and drives it through the same lifecycle; the states here are that
//! shared vocabulary. Vendor sessions log every transition with the task id
//! so a stuck session can be located from the logs alone.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

/// Lifecycle of one speech session.
///
/// `AwaitingStart` only applies to vendors that acknowledge the start command
/// with an explicit event; vendors without an acknowledgment move straight
/// from `Connecting` to `Streaming` once the start frame is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing sent yet.
    Idle,
    /// Transport dial in progress.
    Connecting,
    /// Start command sent, waiting for the vendor's acknowledgment.
    AwaitingStart,
    /// Outbound pacer and inbound reader both running.
    Streaming,
    /// All outbound units sent, finish command dispatched; still reading.
    AwaitingFinish,
    /// Terminal vendor event observed; results are complete.
    Completed,
    /// Vendor failure, timeout, or caller cancellation.
    Failed,
    /// Physical connection closed. Always the last state on every path.
    Closed,
}

impl SessionState {
    /// Whether the session has reached an end state (results final).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Closed
        )
    }
}

/// Record a state transition for one session.
pub(crate) fn transition(state: &mut SessionState, task_id: &str, next: SessionState) {
    debug!(%task_id, from = ?*state, to = ?next, "session state");
    *state = next;
}

/// Bounded waits applied while driving a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Maximum wait for the start acknowledgment.
    pub start: Duration,
    /// Per-read deadline on the inbound side while streaming.
    pub read: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            start: Duration::from_secs(10),
            read: Duration::from_secs(30),
        }
    }
}

/// Generate the opaque per-call task identifier (32 hex chars).
pub(crate) fn new_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}
