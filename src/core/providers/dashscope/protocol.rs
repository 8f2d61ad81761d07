//! The DashScope task envelope.
//!
//! Every text frame on the connection, in either direction, is one
//! [`TaskMessage`]: a `header` naming the action (client → server) or event
//! (server → client) plus a `payload` of task parameters, input, output and
//! usage. Audio travels outside the envelope as raw binary frames.

use serde::{Deserialize, Serialize};

use crate::core::events::VendorFailure;

/// Client actions.
pub const ACTION_RUN_TASK: &str = "run-task";
pub const ACTION_CONTINUE_TASK: &str = "continue-task";
pub const ACTION_FINISH_TASK: &str = "finish-task";

/// Server events.
pub const EVENT_TASK_STARTED: &str = "task-started";
pub const EVENT_RESULT_GENERATED: &str = "result-generated";
pub const EVENT_TASK_FINISHED: &str = "task-finished";
pub const EVENT_TASK_FAILED: &str = "task-failed";

/// Streaming mode sent with every `run-task`.
pub const STREAMING_DUPLEX: &str = "duplex";

/// Envelope header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

/// Envelope payload.
///
/// Output and usage shapes differ per task, so they stay as raw JSON here;
/// the task-specific modules deserialize the parts they understand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

/// One frame of the task protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub header: MessageHeader,
    #[serde(default)]
    pub payload: MessagePayload,
}

impl TaskMessage {
    /// The `run-task` command that opens a task.
    pub fn run_task(task_id: &str, payload: MessagePayload) -> Self {
        Self {
            header: MessageHeader {
                action: Some(ACTION_RUN_TASK.to_string()),
                task_id: task_id.to_string(),
                streaming: Some(STREAMING_DUPLEX.to_string()),
                ..Default::default()
            },
            payload,
        }
    }

    /// A `continue-task` command carrying more input for a running task.
    pub fn continue_task(task_id: &str, input: serde_json::Value) -> Self {
        Self {
            header: MessageHeader {
                action: Some(ACTION_CONTINUE_TASK.to_string()),
                task_id: task_id.to_string(),
                ..Default::default()
            },
            payload: MessagePayload {
                input: Some(input),
                ..Default::default()
            },
        }
    }

    /// The `finish-task` command signalling no more input will be sent.
    pub fn finish_task(task_id: &str) -> Self {
        Self {
            header: MessageHeader {
                action: Some(ACTION_FINISH_TASK.to_string()),
                task_id: task_id.to_string(),
                ..Default::default()
            },
            payload: MessagePayload {
                input: Some(serde_json::json!({})),
                ..Default::default()
            },
        }
    }

    /// Parse one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The server event name, if this is an event frame.
    pub fn event(&self) -> Option<&str> {
        self.header.event.as_deref()
    }

    /// The vendor failure carried by a `task-failed` frame.
    pub fn failure(&self) -> VendorFailure {
        VendorFailure::new(
            self.header.error_code.as_deref().unwrap_or("unknown"),
            self.header
                .error_message
                .as_deref()
                .unwrap_or("task failed without a message"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_task_wire_shape() {
        let payload = MessagePayload {
            task_group: Some("audio".to_string()),
            task: Some("asr".to_string()),
            function: Some("recognition".to_string()),
            model: Some("paraformer-realtime-v2".to_string()),
            parameters: Some(serde_json::json!({"format": "pcm", "sample_rate": 16000})),
            input: Some(serde_json::json!({})),
            ..Default::default()
        };
        let message = TaskMessage::run_task("abc123", payload);
        let value: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(value["header"]["action"], "run-task");
        assert_eq!(value["header"]["task_id"], "abc123");
        assert_eq!(value["header"]["streaming"], "duplex");
        assert_eq!(value["payload"]["model"], "paraformer-realtime-v2");
        assert_eq!(value["payload"]["parameters"]["sample_rate"], 16000);
        // No event/error fields leak into outbound frames.
        assert!(value["header"].get("event").is_none());
        assert!(value["header"].get("error_code").is_none());
    }

    #[test]
    fn test_finish_task_has_empty_input() {
        let message = TaskMessage::finish_task("abc123");
        let value: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(value["header"]["action"], "finish-task");
        assert_eq!(value["payload"]["input"], serde_json::json!({}));
    }

    #[test]
    fn test_parse_event_frame() {
        let text = r#"{
            "header": {"task_id": "abc123", "event": "task-started", "attributes": {}},
            "payload": {}
        }"#;
        let message = TaskMessage::parse(text).unwrap();
        assert_eq!(message.event(), Some(EVENT_TASK_STARTED));
        assert_eq!(message.header.task_id, "abc123");
    }

    #[test]
    fn test_parse_failure_frame() {
        let text = r#"{
            "header": {
                "task_id": "abc123",
                "event": "task-failed",
                "error_code": "40000001",
                "error_message": "invalid audio format"
            },
            "payload": {}
        }"#;
        let message = TaskMessage::parse(text).unwrap();
        assert_eq!(message.event(), Some(EVENT_TASK_FAILED));
        let failure = message.failure();
        assert_eq!(failure.code, "40000001");
        assert_eq!(failure.message, "invalid audio format");
    }

    #[test]
    fn test_parse_tolerates_missing_payload() {
        let message =
            TaskMessage::parse(r#"{"header": {"task_id": "x", "event": "task-finished"}}"#)
                .unwrap();
        assert_eq!(message.event(), Some(EVENT_TASK_FINISHED));
        assert!(message.payload.output.is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_frame() {
        assert!(TaskMessage::parse("not json").is_err());
        assert!(TaskMessage::parse(r#"{"payload": {}}"#).is_err());
    }
}
