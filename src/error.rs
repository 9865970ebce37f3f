// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for Haukka
//!
//! Whole-lifecycle operations (context setup, authentication, launches,
//! progress polling) surface these to the caller. Per-item failures during
//! replay and enrichment are logged and never reach this type.

use thiserror::Error;

/// Result type alias for Haukka operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Haukka
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure talking to the engine
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The engine rejected or could not execute a control API call
    #[error("Engine API error in {operation}: {message}")]
    Api {
        operation: String,
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    /// The engine answered with a document we cannot interpret
    #[error("Unexpected response from {operation}: {reason}")]
    UnexpectedResponse { operation: String, reason: String },

    /// Login template could not be built
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A scan did not finish inside its polling budget
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        last_progress: Option<u8>,
    },

    /// A scan wait was aborted through its cancel token
    #[error("{operation} cancelled at {last_progress:?}%")]
    Cancelled {
        operation: String,
        last_progress: Option<u8>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an unexpected-response error
    pub fn unexpected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Error::Encoding(msg.into())
    }

    /// Check if the engine itself rejected the call
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if the wait was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Engine error code (`does_not_exist`, `bad_view`, ...) if the engine sent one
    pub fn engine_code(&self) -> Option<&str> {
        match self {
            Error::Api { code: Some(c), .. } => Some(c),
            _ => None,
        }
    }
}
