//! Shared error type across meshrank crates.

use thiserror::Error;

/// Stable error codes, suitable for logs and machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration failed to parse or validate.
    InvalidConfig,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// A selector was ranked against a tag set it does not match.
    InvalidSelectorUse,
    /// Dataplane lookup by name failed.
    UnknownDataplane,
    /// Internal error (I/O and the like).
    Internal,
}

impl ErrorCode {
    /// String representation used in output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::InvalidSelectorUse => "INVALID_SELECTOR_USE",
            ErrorCode::UnknownDataplane => "UNKNOWN_DATAPLANE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("selector {selector} does not match tags {tags}")]
    InvalidSelectorUse { selector: String, tags: String },
    #[error("unknown dataplane: {0}")]
    UnknownDataplane(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeshError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            MeshError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            MeshError::InvalidSelectorUse { .. } => ErrorCode::InvalidSelectorUse,
            MeshError::UnknownDataplane(_) => ErrorCode::UnknownDataplane,
            MeshError::Internal(_) => ErrorCode::Internal,
        }
    }
}
