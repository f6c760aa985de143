use thiserror::Error;

/// Result type for pattern analysis operations
pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur while analyzing a document
///
/// Detection itself is heuristic and never fails on odd-looking text; these
/// variants cover input that is not a document at all, an inconsistent
/// companion model, and configuration problems.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The buffer is not usable as document text
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The paragraph/code-block model does not describe this document
    #[error("Invalid document model: {0}")]
    InvalidModel(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PatternError {
    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create an invalid model error
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
