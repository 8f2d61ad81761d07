pub mod base;
pub mod dashscope;

// Re-export public types and traits
pub use base::{SpeechSynthesizer, SynthesisOptions, TtsError};
pub use dashscope::{DashScopeTts, DashScopeTtsConfig};

/// Supported synthesis vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtsVendor {
    /// Alibaba DashScope streaming synthesis (cosyvoice models).
    DashScope,
}

impl std::fmt::Display for TtsVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtsVendor::DashScope => write!(f, "dashscope"),
        }
    }
}

impl std::str::FromStr for TtsVendor {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashscope" => Ok(TtsVendor::DashScope),
            _ => Err(TtsError::InvalidConfiguration(format!(
                "Unsupported synthesis vendor: {s}. Supported vendors: dashscope"
            ))),
        }
    }
}

/// Factory function to create a synthesis provider by vendor name.
pub fn create_synthesizer(
    vendor: &str,
    config: DashScopeTtsConfig,
) -> Result<Box<dyn SpeechSynthesizer>, TtsError> {
    match vendor.parse::<TtsVendor>()? {
        TtsVendor::DashScope => Ok(Box::new(DashScopeTts::new(config)?)),
    }
}

/// List of supported synthesis vendor names.
pub fn get_supported_tts_vendors() -> Vec<&'static str> {
    vec!["dashscope"]
}

#[cfg(test)]
mod factory_tests {
    use super::*;

    #[test]
    fn test_vendor_parse_and_display() {
        assert_eq!("dashscope".parse::<TtsVendor>().unwrap(), TtsVendor::DashScope);
        assert_eq!(TtsVendor::DashScope.to_string(), "dashscope");
        assert!("espeak".parse::<TtsVendor>().is_err());
    }

    #[test]
    fn test_create_synthesizer_requires_api_key() {
        assert!(matches!(
            create_synthesizer("dashscope", DashScopeTtsConfig::default()),
            Err(TtsError::InvalidConfiguration(_))
        ));
    }
}
