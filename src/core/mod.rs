pub mod asr;
pub mod assess;
pub mod audio;
pub mod events;
pub mod providers;
pub mod session;
pub mod storage;
pub mod transport;
pub mod tts;

// Re-export commonly used types for convenience
pub use asr::{
    AsrError, AsrVendor, DashScopeAsr, DashScopeAsrConfig, FinalDetection, SpeechRecognizer,
    Transcription, create_recognizer, get_supported_asr_vendors,
};

pub use tts::{
    DashScopeTts, DashScopeTtsConfig, SpeechSynthesizer, SynthesisOptions, TtsError, TtsVendor,
    create_synthesizer, get_supported_tts_vendors,
};

pub use assess::{
    AssessError, AssessVendor, AssessmentResult, Category, PhonemeScore, PronunciationAssessor,
    TimeSpan, WordScore, XfyunAssessor, XfyunIseConfig, create_assessor,
    get_supported_assess_vendors,
};

pub use events::{RecognizedWord, StreamEvent, VendorFailure};
pub use session::{SessionState, SessionTimeouts};
pub use storage::{BlobStore, MemoryBlobStore, StorageError};
