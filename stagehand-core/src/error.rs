//! Unified error type definition

use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// The asset loader has no template registered under this id
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error from a file-backed adapter
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether it is expected behavior (content drift, bad user config), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::TemplateNotFound(_) | Self::InvalidConfig(_) => true,
            Self::StorageError(_) | Self::SerializationError(_) | Self::Io(_) => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
