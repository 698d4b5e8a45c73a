//! Error types for repository-host API operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the repository-host API.
#[derive(Debug, Error)]
pub enum AzdoError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A 2xx response carried a body that is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API returned a non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Get a short error message suitable for log context.
pub fn short_error_message(err: &AzdoError) -> String {
    match err {
        AzdoError::Http(e) => format!("transport: {e}"),
        AzdoError::Json(_) => "JSON parse error".to_string(),
        AzdoError::Api { status, message } => {
            if message.len() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {status}: {truncated}...")
            } else {
                format!("HTTP {status}: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_truncates_long_api_bodies() {
        let err = AzdoError::Api {
            status: 500,
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 70);
    }

    #[test]
    fn short_message_keeps_short_api_bodies() {
        let err = AzdoError::Api {
            status: 404,
            message: "project not found".to_string(),
        };
        assert_eq!(short_error_message(&err), "HTTP 404: project not found");
    }
}
