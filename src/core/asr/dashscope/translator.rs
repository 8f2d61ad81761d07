//! Translation of DashScope recognition events into domain stream events.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::events::{RecognizedWord, StreamEvent};
use crate::core::providers::dashscope::protocol::{
    EVENT_RESULT_GENERATED, EVENT_TASK_FAILED, EVENT_TASK_FINISHED, EVENT_TASK_STARTED,
    TaskMessage,
};

/// How a `result-generated` event is recognized as a completed segment.
///
/// Two revisions of the vendor protocol are in the wild and they disagree:
/// the older one omits the sentence end time until the segment is complete,
/// the newer one always sends timings and flags completion with an explicit
/// boolean. Both are kept selectable; picking the wrong one for a deployment
/// turns every final into a partial (or the reverse), so this is part of the
/// vendor configuration rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalDetection {
    /// A populated sentence `end_time` marks the segment complete.
    EndTimePresent,
    /// An explicit `sentence_end` boolean marks the segment complete.
    #[default]
    SentenceEndFlag,
}

/// Recognition output carried by a `result-generated` payload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecognitionOutput {
    #[serde(default)]
    pub sentence: Option<Sentence>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Sentence {
    #[serde(default)]
    pub end_time: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sentence_end: Option<bool>,
    #[serde(default)]
    pub words: Vec<SentenceWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SentenceWord {
    #[serde(default)]
    pub begin_time: Option<u64>,
    #[serde(default)]
    pub end_time: Option<u64>,
    #[serde(default)]
    pub text: String,
}

/// Usage metadata attached to recognition events.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecognitionUsage {
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Maps vendor event frames to [`StreamEvent`]s.
pub(crate) struct EventTranslator {
    detection: FinalDetection,
}

impl EventTranslator {
    pub fn new(detection: FinalDetection) -> Self {
        Self { detection }
    }

    /// Translate one inbound frame. Returns `None` for frames that carry no
    /// domain event (the start acknowledgment, unknown event names).
    pub fn translate(&self, message: &TaskMessage) -> Option<StreamEvent> {
        match message.event() {
            Some(EVENT_RESULT_GENERATED) => self.translate_result(message),
            Some(EVENT_TASK_FINISHED) => Some(StreamEvent::Done),
            Some(EVENT_TASK_FAILED) => Some(StreamEvent::Error(message.failure())),
            Some(EVENT_TASK_STARTED) => None, // consumed by the session's ack wait
            Some(other) => {
                debug!(event = other, "ignoring unknown vendor event");
                None
            }
            None => {
                debug!("ignoring frame without an event header");
                None
            }
        }
    }

    fn translate_result(&self, message: &TaskMessage) -> Option<StreamEvent> {
        let raw = message.payload.output.as_ref()?;
        let output: RecognitionOutput = match serde_json::from_value(raw.clone()) {
            Ok(output) => output,
            Err(e) => {
                warn!("skipping unparseable recognition output: {e}");
                return None;
            }
        };
        let sentence = output.sentence?;

        let is_final = match self.detection {
            FinalDetection::EndTimePresent => sentence.end_time.is_some(),
            FinalDetection::SentenceEndFlag => sentence.sentence_end.unwrap_or(false),
        };

        let words = sentence
            .words
            .iter()
            .map(|w| RecognizedWord {
                text: w.text.clone(),
                begin_ms: w.begin_time.unwrap_or(0),
                end_ms: w.end_time.or(w.begin_time).unwrap_or(0),
            })
            .collect();

        if is_final {
            let duration_secs = message
                .payload
                .usage
                .as_ref()
                .and_then(|u| serde_json::from_value::<RecognitionUsage>(u.clone()).ok())
                .and_then(|u| u.duration);
            Some(StreamEvent::Final {
                text: sentence.text,
                words,
                duration_secs,
            })
        } else {
            Some(StreamEvent::Partial {
                text: sentence.text,
                words,
            })
        }
    }
}
