//! Shared plumbing for the DashScope WebSocket inference API.
//!
//! Both the recognition and synthesis clients speak the same task-oriented
//! envelope over the same endpoint; this module holds the authentication
//! helper and the envelope codec they share.

pub mod auth;
pub mod protocol;

pub use auth::{DASHSCOPE_WS_URL, bearer_header, build_ws_request};
pub use protocol::{
    ACTION_CONTINUE_TASK, ACTION_FINISH_TASK, ACTION_RUN_TASK, EVENT_RESULT_GENERATED,
    EVENT_TASK_FAILED, EVENT_TASK_FINISHED, EVENT_TASK_STARTED, MessageHeader, MessagePayload,
    TaskMessage,
};
