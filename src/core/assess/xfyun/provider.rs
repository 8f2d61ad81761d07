//! Assessment capability adapter over [`IseSession`].

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use super::config::XfyunIseConfig;
use super::session::IseSession;
use crate::core::assess::base::{
    AssessError, AssessmentResult, Category, PronunciationAssessor,
};

/// iFlytek ISE pronunciation assessment provider.
///
/// Each call opens exactly one session; nothing is shared between calls.
pub struct XfyunAssessor {
    config: XfyunIseConfig,
}

impl XfyunAssessor {
    pub fn new(config: XfyunIseConfig) -> Result<Self, AssessError> {
        if !config.has_credentials() {
            return Err(AssessError::InvalidInput(
                "app id, API key and API secret are required for ISE".to_string(),
            ));
        }
        Ok(Self { config })
    }
}

#[async_trait]
impl PronunciationAssessor for XfyunAssessor {
    async fn assess(
        &self,
        reference_text: &str,
        audio: Bytes,
        category: Category,
    ) -> Result<AssessmentResult, AssessError> {
        if reference_text.trim().is_empty() {
            return Err(AssessError::InvalidInput(
                "no reference text to assess against".to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(AssessError::InvalidInput("no audio to assess".to_string()));
        }

        let session = IseSession::connect(self.config.clone()).await?;
        let task_id = session.task_id().to_string();
        // Detached so the session always reaches its own teardown even if
        // the caller stops waiting.
        let handle = tokio::spawn(session.run(reference_text.to_string(), audio, category));
        let result = handle
            .await
            .map_err(|e| AssessError::Internal(format!("session task failed: {e}")))??;

        info!(
            %task_id,
            total = result.total_score,
            words = result.words.len(),
            "assessment finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            XfyunAssessor::new(XfyunIseConfig::default()),
            Err(AssessError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected_before_connecting() {
        let assessor = XfyunAssessor::new(XfyunIseConfig {
            app_id: "app".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            ..Default::default()
        })
        .unwrap();

        let result = assessor
            .assess("", Bytes::from_static(b"audio"), Category::Sentence)
            .await;
        assert!(matches!(result, Err(AssessError::InvalidInput(_))));

        let result = assessor
            .assess("The cat sat", Bytes::new(), Category::Sentence)
            .await;
        assert!(matches!(result, Err(AssessError::InvalidInput(_))));
    }
}
