use thiserror::Error;

use marquee_core::models::{StreamError, StreamErrorKind};

/// Errors from the catalog gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    /// Build the error for a non-success status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Classify for display on a stream.
    pub fn to_stream_error(&self) -> StreamError {
        let kind = match self {
            Self::Http(_) | Self::Url(_) => StreamErrorKind::Connectivity,
            Self::Unauthorized { .. } => StreamErrorKind::Unauthorized,
            Self::Api { .. } | Self::Parse(_) => StreamErrorKind::Server,
        };
        StreamError {
            kind,
            message: self.to_string(),
        }
    }
}
