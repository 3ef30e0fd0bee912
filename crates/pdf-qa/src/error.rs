//! Error types for the QA pipeline

use std::fmt;
use thiserror::Error;

/// Result type alias for pdf-qa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error taxonomy used for reporting and for callers that branch on failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing settings, including invalid chunking parameters
    Config,
    /// Unreadable or invalid input document
    Load,
    /// Network, auth, quota or malformed-response failures from watsonx.ai
    RemoteService,
    /// Rejected user input (empty question, missing upload)
    Validation,
    /// Local invariant violations and I/O
    Internal,
}

impl ErrorKind {
    /// Label shown in error reports and on the web form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::Load => "LoadError",
            Self::RemoteService => "RemoteServiceError",
            Self::Validation => "ValidationError",
            Self::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// pdf-qa errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be loaded
    #[error("Failed to load '{path}': {message}")]
    Load { path: String, message: String },

    /// Remote service (embedding or generation) failure
    #[error("{service} request failed: {message}")]
    RemoteService { service: String, message: String },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Vector index misuse (unsealed query, dimension mismatch)
    #[error("Vector index error: {0}")]
    Index(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a load error
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a remote service error
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Taxonomy bucket for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Load { .. } => ErrorKind::Load,
            Self::RemoteService { .. } => ErrorKind::RemoteService,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Index(_) | Self::Io(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Config);
        assert_eq!(Error::load("a.pdf", "missing").kind(), ErrorKind::Load);
        assert_eq!(Error::remote("embeddings", "401").kind(), ErrorKind::RemoteService);
        assert_eq!(Error::validation("empty").kind(), ErrorKind::Validation);
        assert_eq!(Error::index("unsealed").kind(), ErrorKind::Internal);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(Error::from(io).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::load("/tmp/missing.pdf", "file does not exist");
        assert_eq!(
            err.to_string(),
            "Failed to load '/tmp/missing.pdf': file does not exist"
        );
        assert_eq!(err.kind().label(), "LoadError");
    }
}
