//! Errors raised while talking to the equipment backend.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, broken body stream.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Backend {
        status: StatusCode,
        message: Option<String>,
    },

    /// A 2xx body that does not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No backend URL configured")]
    NoBaseUrl,
}

impl ApiError {
    /// The `error` string the backend put in its response body, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Backend { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_only_for_backend_errors() {
        let err = ApiError::Backend {
            status: StatusCode::BAD_REQUEST,
            message: Some("Missing columns: Type".to_string()),
        };
        assert_eq!(err.backend_message(), Some("Missing columns: Type"));
        assert_eq!(
            err.to_string(),
            "Backend returned 400 Bad Request: Missing columns: Type"
        );

        let io = ApiError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.backend_message(), None);
    }
}
