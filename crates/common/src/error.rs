//! Error types shared across Flipbook crates.

use std::path::PathBuf;

/// Top-level error type for Flipbook operations.
#[derive(Debug, thiserror::Error)]
pub enum FlipbookError {
    #[error("Failed to decode frame '{name}': {message}")]
    Decode { name: String, message: String },

    #[error("Encoder error: {message}")]
    Encode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("No frames to export")]
    NothingToExport,

    #[error("Busy: {message}")]
    Busy { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FlipbookError.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

impl FlipbookError {
    pub fn decode(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error is shown to the user as a blocking notice rather
    /// than a failure (empty-state operations, serialization conflicts).
    pub fn is_blocking_notice(&self) -> bool {
        matches!(self, Self::NothingToExport | Self::Busy { .. })
    }
}
