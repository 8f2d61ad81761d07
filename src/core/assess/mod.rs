pub mod base;
pub mod xfyun;

// Re-export public types and traits
pub use base::{
    AssessError, AssessmentResult, Category, PhonemeScore, PronunciationAssessor, TimeSpan,
    WordScore,
};
pub use xfyun::{XfyunAssessor, XfyunIseConfig};

/// Supported assessment vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssessVendor {
    /// iFlytek intelligent speech evaluation (ISE).
    Xfyun,
}

impl std::fmt::Display for AssessVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessVendor::Xfyun => write!(f, "xfyun"),
        }
    }
}

impl std::str::FromStr for AssessVendor {
    type Err = AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xfyun" | "iflytek" => Ok(AssessVendor::Xfyun),
            _ => Err(AssessError::InvalidInput(format!(
                "Unsupported assessment vendor: {s}. Supported vendors: xfyun"
            ))),
        }
    }
}

/// Factory function to create an assessment provider by vendor name.
pub fn create_assessor(
    vendor: &str,
    config: XfyunIseConfig,
) -> Result<Box<dyn PronunciationAssessor>, AssessError> {
    match vendor.parse::<AssessVendor>()? {
        AssessVendor::Xfyun => Ok(Box::new(XfyunAssessor::new(config)?)),
    }
}

/// List of supported assessment vendor names.
pub fn get_supported_assess_vendors() -> Vec<&'static str> {
    vec!["xfyun"]
}
