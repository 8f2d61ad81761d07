//! Integration tests for the DashScope recognition and synthesis providers.
//!
//! These cover the public surface: factories, configuration validation and
//! input rejection. Tests that hit the live API are marked `#[ignore]` and
//! need DASHSCOPE_API_KEY in the environment.

use bytes::Bytes;
use kidtalk::core::asr::{
    AsrError, DashScopeAsrConfig, FinalDetection, SpeechRecognizer, create_recognizer,
    get_supported_asr_vendors,
};
use kidtalk::core::tts::{
    DashScopeTtsConfig, SpeechSynthesizer, SynthesisOptions, TtsError, create_synthesizer,
    get_supported_tts_vendors,
};

#[test]
fn test_dashscope_in_supported_vendors() {
    assert!(get_supported_asr_vendors().contains(&"dashscope"));
    assert!(get_supported_tts_vendors().contains(&"dashscope"));
}

#[test]
fn test_create_providers_by_name() {
    let asr = create_recognizer(
        "dashscope",
        DashScopeAsrConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    );
    assert!(asr.is_ok());

    let tts = create_synthesizer(
        "dashscope",
        DashScopeTtsConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    );
    assert!(tts.is_ok());
}

#[test]
fn test_unknown_vendor_is_rejected() {
    assert!(matches!(
        create_recognizer("festival", DashScopeAsrConfig::default()),
        Err(AsrError::InvalidInput(_))
    ));
    assert!(matches!(
        create_synthesizer("festival", DashScopeTtsConfig::default()),
        Err(TtsError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_empty_inputs_rejected_before_any_connection() {
    let asr = create_recognizer(
        "dashscope",
        DashScopeAsrConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(matches!(
        asr.recognize(Bytes::new(), "pcm", 16000).await,
        Err(AsrError::InvalidInput(_))
    ));

    let tts = create_synthesizer(
        "dashscope",
        DashScopeTtsConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(matches!(
        tts.synthesize("", &SynthesisOptions::unset()).await,
        Err(TtsError::InvalidInput(_))
    ));
}

// =============================================================================
// Live API tests (require DASHSCOPE_API_KEY)
// =============================================================================

fn live_key() -> Option<String> {
    std::env::var("DASHSCOPE_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Round-trip: synthesize a phrase, then recognize the synthesized audio.
#[tokio::test]
#[ignore = "requires DASHSCOPE_API_KEY and network access"]
async fn test_live_synthesize_then_recognize() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let Some(api_key) = live_key() else {
        eprintln!("DASHSCOPE_API_KEY not set, skipping");
        return;
    };

    let tts = create_synthesizer(
        "dashscope",
        DashScopeTtsConfig {
            api_key: api_key.clone(),
            ..Default::default()
        },
    )
    .unwrap();
    let options = SynthesisOptions {
        format: "pcm".to_string(),
        sample_rate: 16000,
        ..SynthesisOptions::unset()
    };
    let audio = tts
        .synthesize("The cat sat on the mat.", &options)
        .await
        .expect("synthesis failed");
    assert!(!audio.is_empty());

    let asr = create_recognizer(
        "dashscope",
        DashScopeAsrConfig {
            api_key,
            final_detection: FinalDetection::SentenceEndFlag,
            ..Default::default()
        },
    )
    .unwrap();
    let transcription = asr
        .recognize(audio, "pcm", 16000)
        .await
        .expect("recognition failed");
    assert!(
        transcription.text.to_lowercase().contains("cat"),
        "unexpected transcript: {}",
        transcription.text
    );
}
