//! Error type for the file-facing edges of klineplot.
//!
//! The chart compiler itself never fails; these errors come from loading
//! payloads, reading options and writing specs.

/// Top-level error type for klineplot.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to decode payload from {source_name}: {reason}")]
    PayloadDecode { source_name: String, reason: String },

    #[error("CSV error in {file}: {reason}")]
    Csv { file: String, reason: String },

    #[error("failed to encode plot spec: {reason}")]
    Encode { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ChartError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ChartError> for std::process::ExitCode {
    fn from(err: &ChartError) -> Self {
        let code: u8 = match err {
            ChartError::Io(_) | ChartError::Encode { .. } => 1,
            ChartError::ConfigParse { .. } | ChartError::ConfigInvalid { .. } => 2,
            ChartError::PayloadDecode { .. } => 3,
            ChartError::Csv { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
