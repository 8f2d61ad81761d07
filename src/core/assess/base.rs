//! Base types for pronunciation-assessment providers.

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::transport::TransportError;

/// Error types for assessment operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Assessment vendor error {code}: {message}")]
    Vendor { code: String, message: String },
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed scoring report: {0}")]
    MalformedReport(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransportError> for AssessError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::ConnectionFailed(m) => AssessError::ConnectionFailed(m),
            TransportError::SendFailed(m) | TransportError::ReceiveFailed(m) => {
                AssessError::Network(m)
            }
        }
    }
}

/// What kind of reading the learner was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A single word.
    Word,
    /// One sentence.
    Sentence,
    /// A multi-sentence passage.
    Passage,
}

impl Category {
    /// The vendor's name for this reading type.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Category::Word => "read_word",
            Category::Sentence => "read_sentence",
            Category::Passage => "read_chapter",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Word => write!(f, "word"),
            Category::Sentence => write!(f, "sentence"),
            Category::Passage => write!(f, "passage"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(Category::Word),
            "sentence" => Ok(Category::Sentence),
            "passage" | "chapter" => Ok(Category::Passage),
            _ => Err(AssessError::InvalidInput(format!(
                "Unsupported assessment category: {s}. Supported: word, sentence, passage"
            ))),
        }
    }
}

/// A time range within the recorded audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSpan {
    pub begin_ms: u32,
    pub end_ms: u32,
}

/// Score for one phoneme of a spoken word.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeScore {
    pub phoneme: String,
    /// 0–100.
    pub score: f32,
    pub span: TimeSpan,
}

/// Score for one spoken word.
#[derive(Debug, Clone, PartialEq)]
pub struct WordScore {
    pub word: String,
    /// 0–100.
    pub score: f32,
    pub span: TimeSpan,
    /// Phonemes in spoken order; silence and filler segments are excluded.
    pub phonemes: Vec<PhonemeScore>,
}

/// A complete pronunciation assessment.
///
/// Word order matches the order spoken in the reference text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentResult {
    /// Overall score, 0–100.
    pub total_score: f32,
    /// How accurately each sound was produced, 0–100.
    pub accuracy: f32,
    /// Pacing and flow, 0–100.
    pub fluency: f32,
    /// How much of the reference text was read, 0–100.
    pub completeness: f32,
    /// Tone and stress, 0–100.
    pub intonation: f32,
    /// Per-word results in spoken order.
    pub words: Vec<WordScore>,
}

/// Capability interface for pronunciation assessment.
///
/// Implementations open exactly one vendor session per call.
#[async_trait]
pub trait PronunciationAssessor: Send + Sync {
    /// Score `audio` against `reference_text`.
    async fn assess(
        &self,
        reference_text: &str,
        audio: Bytes,
        category: Category,
    ) -> Result<AssessmentResult, AssessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(Category::Word.wire_name(), "read_word");
        assert_eq!(Category::Sentence.wire_name(), "read_sentence");
        assert_eq!(Category::Passage.wire_name(), "read_chapter");
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("word".parse::<Category>().unwrap(), Category::Word);
        assert_eq!("Sentence".parse::<Category>().unwrap(), Category::Sentence);
        assert_eq!("passage".parse::<Category>().unwrap(), Category::Passage);
        assert_eq!("chapter".parse::<Category>().unwrap(), Category::Passage);
        assert!("paragraph".parse::<Category>().is_err());

        assert_eq!(Category::Sentence.to_string(), "sentence");
    }

    #[test]
    fn test_transport_error_mapping() {
        let e: AssessError = TransportError::ReceiveFailed("reset".to_string()).into();
        assert!(matches!(e, AssessError::Network(_)));
    }
}
