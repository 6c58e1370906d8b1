//! Error types for the playground pipeline.
//!
//! Library crates use [`PlaygroundError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all playground operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Missing or malformed caller input. Raised before any network call.
    #[error("{message}")]
    Validation { message: String },

    /// Document retrieval failed (transport, non-2xx, timeout, short body).
    #[error("{message}")]
    Fetch {
        message: String,
        status: Option<u16>,
    },

    /// No usable JSON could be located in a free-text model response.
    #[error("{message}")]
    Extraction { message: String },

    /// Generation backend call failed or returned output violating the schema.
    #[error("{0}")]
    Generation(String),

    /// Transactional email API failure.
    #[error("relay error: {0}")]
    Relay(String),

    /// The caller cancelled the request.
    #[error("request was cancelled")]
    Cancelled,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Coarse classification of a [`PlaygroundError`], used for logging and by
/// callers that need to branch without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Validation,
    Fetch,
    Extraction,
    Generation,
    Relay,
    Cancelled,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Validation => "validation",
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Generation => "generation",
            Self::Relay => "relay",
            Self::Cancelled => "cancelled",
            Self::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PlaygroundError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a fetch error with no HTTP status attached.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: None,
        }
    }

    /// Create a fetch error for a non-success HTTP status.
    pub fn http_status(status: u16, reason: &str) -> Self {
        let message = if reason.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status} {reason}")
        };
        Self::Fetch {
            message,
            status: Some(status),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Relay(_) => ErrorKind::Relay,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// HTTP status attached to a fetch failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PlaygroundError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = PlaygroundError::validation("Please provide a URL.");
        assert_eq!(err.to_string(), "Please provide a URL.");
    }

    #[test]
    fn http_status_carries_code_and_reason() {
        let err = PlaygroundError::http_status(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), ErrorKind::Fetch);

        let err = PlaygroundError::http_status(599, "");
        assert_eq!(err.to_string(), "HTTP 599");
    }

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(PlaygroundError::extraction("x").kind(), ErrorKind::Extraction);
        assert_eq!(PlaygroundError::Generation("x".into()).kind(), ErrorKind::Generation);
        assert_eq!(PlaygroundError::Cancelled.kind().as_str(), "cancelled");
        assert_eq!(PlaygroundError::fetch("x").status(), None);
    }
}
