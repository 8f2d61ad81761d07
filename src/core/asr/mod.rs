pub mod base;
pub mod dashscope;

// Re-export public types and traits
pub use base::{AsrError, SpeechRecognizer, Transcription};
pub use dashscope::{DashScopeAsr, DashScopeAsrConfig, FinalDetection};

/// Supported recognition vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsrVendor {
    /// Alibaba DashScope streaming recognition (paraformer models).
    DashScope,
}

impl std::fmt::Display for AsrVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AsrVendor::DashScope => write!(f, "dashscope"),
        }
    }
}

impl std::str::FromStr for AsrVendor {
    type Err = AsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashscope" => Ok(AsrVendor::DashScope),
            _ => Err(AsrError::InvalidInput(format!(
                "Unsupported recognition vendor: {s}. Supported vendors: dashscope"
            ))),
        }
    }
}

/// Factory function to create a recognition provider by vendor name.
pub fn create_recognizer(
    vendor: &str,
    config: DashScopeAsrConfig,
) -> Result<Box<dyn SpeechRecognizer>, AsrError> {
    match vendor.parse::<AsrVendor>()? {
        AsrVendor::DashScope => Ok(Box::new(DashScopeAsr::new(config)?)),
    }
}

/// List of supported recognition vendor names.
pub fn get_supported_asr_vendors() -> Vec<&'static str> {
    vec!["dashscope"]
}

#[cfg(test)]
mod factory_tests {
    use super::*;

    #[test]
    fn test_vendor_parse_and_display() {
        assert_eq!("dashscope".parse::<AsrVendor>().unwrap(), AsrVendor::DashScope);
        assert_eq!("DashScope".parse::<AsrVendor>().unwrap(), AsrVendor::DashScope);
        assert_eq!(AsrVendor::DashScope.to_string(), "dashscope");

        let result = "hal9000".parse::<AsrVendor>();
        assert!(matches!(result, Err(AsrError::InvalidInput(_))));
    }

    #[test]
    fn test_create_recognizer_requires_api_key() {
        let config = DashScopeAsrConfig::default();
        assert!(matches!(
            create_recognizer("dashscope", config),
            Err(AsrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_create_recognizer_with_key() {
        let config = DashScopeAsrConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        assert!(create_recognizer("dashscope", config).is_ok());
    }
}
