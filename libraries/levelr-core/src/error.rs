/// Core error types for Levelr
use thiserror::Error;

/// Result type alias using `LevelError`
pub type Result<T> = std::result::Result<T, LevelError>;

/// Core error type for Levelr
///
/// File-level variants (`Decode`, `Measurement`, `ExternalNormalization`,
/// `Encode`) are turned into a failed outcome for that file and never stop a
/// batch. `Configuration` is batch-level: the run does not start.
#[derive(Error, Debug)]
pub enum LevelError {
    /// Unreadable, corrupt, or unsupported input
    #[error("Decode error: {0}")]
    Decode(String),

    /// External measurement unavailable, failed, or unparseable
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// External normalization pass exited abnormally
    #[error("External normalization error: {0}")]
    ExternalNormalization(String),

    /// Output could not be written in the requested format
    #[error("Encode error: {0}")]
    Encode(String),

    /// Run cannot start (missing folders, nothing selected, bad settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Output tree could not be packaged
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LevelError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a measurement error
    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }

    /// Create an external normalization error
    pub fn external_normalization(msg: impl Into<String>) -> Self {
        Self::ExternalNormalization(msg.into())
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }
}
