//! Error types for Reelplay Core
//!
//! Two families live here:
//! - [`Error`]: contract violations reported synchronously to the embedding code
//!   (bad identifiers, bad options, out-of-range quality selection).
//! - [`PlaybackError`]: classified runtime failures delivered through the
//!   caller's `on_error` callback. These never cross an operation boundary as
//!   a `Result`.

use crate::types::StreamingErrorKind;
use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Controller contract errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid video identifier: {0:?}")]
    InvalidVideoId(String),

    #[error("Invalid video host: {0}")]
    InvalidHost(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Quality level {index} out of range ({available} levels available)")]
    QualityOutOfRange { index: usize, available: usize },

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidVideoId(_) => "INVALID_VIDEO_ID",
            Error::InvalidHost(_) => "INVALID_HOST",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::QualityOutOfRange { .. } => "QUALITY_OUT_OF_RANGE",
            Error::ManifestParse(_) => "MANIFEST_PARSE",
            Error::Url(_) => "URL",
            Error::Json(_) => "JSON",
        }
    }
}

/// Failure reported by a platform capability (media surface, fullscreen, engine)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classified playback failure handed to the `on_error` callback
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The streaming engine gave up on the session
    #[error("Fatal streaming error: {kind} ({details})")]
    FatalStreaming {
        kind: StreamingErrorKind,
        details: String,
    },

    /// The platform refused or failed a fullscreen transition
    #[error("Fullscreen request failed: {reason}")]
    Fullscreen { reason: String },

    /// Neither an engine nor native playback can handle the manifest
    #[error("HLS playback is not supported on this platform ({mime})")]
    Unsupported { mime: String },
}

impl PlaybackError {
    /// Returns true if the session cannot continue without a fresh attach
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlaybackError::FatalStreaming { .. } | PlaybackError::Unsupported { .. }
        )
    }

    /// Returns the error code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            PlaybackError::FatalStreaming { kind, .. } => match kind {
                StreamingErrorKind::Network => "STREAM_NETWORK",
                StreamingErrorKind::Media => "STREAM_MEDIA",
                StreamingErrorKind::Other => "STREAM_OTHER",
            },
            PlaybackError::Fullscreen { .. } => "FULLSCREEN",
            PlaybackError::Unsupported { .. } => "UNSUPPORTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_streaming_message_embeds_engine_detail() {
        let err = PlaybackError::FatalStreaming {
            kind: StreamingErrorKind::Network,
            details: "manifestLoadError".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Fatal streaming error: network (manifestLoadError)"
        );
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "STREAM_NETWORK");
    }

    #[test]
    fn test_fullscreen_error_is_not_fatal() {
        let err = PlaybackError::Fullscreen {
            reason: "permission denied".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("Fullscreen request failed"));
    }

    #[test]
    fn test_quality_out_of_range_message() {
        let err = Error::QualityOutOfRange {
            index: 7,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Quality level 7 out of range (2 levels available)"
        );
        assert_eq!(err.error_code(), "QUALITY_OUT_OF_RANGE");
    }
}
