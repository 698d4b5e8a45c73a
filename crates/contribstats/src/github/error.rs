//! Error types for source-host API operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the source-host API.
///
/// A 404 is not represented here: probing for optional resources is
/// expected, so the client resolves it to `None` instead of an error.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A 2xx response carried a body that is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API returned a non-2xx, non-404 response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Get a short error message suitable for log context.
pub fn short_error_message(err: &GithubError) -> String {
    match err {
        GithubError::Http(e) => format!("transport: {e}"),
        GithubError::Json(_) => "JSON parse error".to_string(),
        GithubError::Api { status, message } => {
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
    fn short_message_includes_status() {
        let err = GithubError::Api {
            status: 403,
            message: "rate limited".to_string(),
        };
        assert_eq!(short_error_message(&err), "HTTP 403: rate limited");
    }
}
