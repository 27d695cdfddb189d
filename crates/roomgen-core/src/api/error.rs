use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::ValidationError;

/// The three disjoint failure categories of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered, but not with a usable success response.
    ServerResponded,
    /// The request went out and nothing came back (unreachable, timed out).
    NoResponse,
    /// The request was never sent.
    Local,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized ({status}) - token may be expired")]
    Unauthorized {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Server error {status}: {body}")]
    Server {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("Invalid response ({status}): {reason}")]
    InvalidResponse { status: StatusCode, reason: String },

    #[error("No response from server: {source}")]
    NoResponse {
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request could not be sent: {0}")]
    Local(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload shape used by the backend: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
            None => body.to_string(),
            Some((cut, _)) => format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            ),
        }
    }

    /// Pull the human-readable message out of a JSON error body, if any.
    fn extract_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 | 403 => ApiError::Unauthorized { status, message },
            _ => ApiError::Server {
                status,
                message,
                body: Self::truncate_body(body),
            },
        }
    }

    /// Classify a transport error raised by reqwest.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Local(err.to_string())
        } else {
            ApiError::NoResponse {
                timed_out: err.is_timeout(),
                source: err,
            }
        }
    }

    pub fn invalid_response(status: StatusCode, reason: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            status,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized { .. }
            | ApiError::Server { .. }
            | ApiError::InvalidResponse { .. } => ErrorKind::ServerResponded,
            ApiError::NoResponse { .. } => ErrorKind::NoResponse,
            ApiError::Local(_) | ApiError::Validation(_) => ErrorKind::Local,
        }
    }

    /// True when the server rejected the credential (or its absence).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::NoResponse { timed_out: true, .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::InvalidResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server in its error body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            ApiError::Unauthorized { .. } => {
                "Your session is no longer valid. Please log in again.".to_string()
            }
            ApiError::Server { .. } => "Something went wrong".to_string(),
            ApiError::InvalidResponse { reason, .. } => reason.clone(),
            ApiError::NoResponse { timed_out: true, .. } => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ApiError::NoResponse { .. } => {
                "Unable to reach the server. Check your connection.".to_string()
            }
            ApiError::Validation(e) => e.to_string(),
            ApiError::Local(reason) => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_map_to_unauthorized() {
        for code in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = ApiError::from_status(code, r#"{"message":"jwt expired"}"#);
            assert!(err.is_unauthorized());
            assert_eq!(err.kind(), ErrorKind::ServerResponded);
            assert_eq!(err.server_message(), Some("jwt expired"));
            assert_eq!(err.status(), Some(code));
        }
    }

    #[test]
    fn test_other_statuses_map_to_server() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"Email taken"}"#);
        assert!(!err.is_unauthorized());
        assert_eq!(err.kind(), ErrorKind::ServerResponded);
        assert_eq!(err.user_message(), "Email taken");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(err, ApiError::Server { message: None, .. }));
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_message_falls_back_to_error_field() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"Design not found"}"#);
        assert_eq!(err.server_message(), Some("Design not found"));
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"   "}"#);
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"é".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_local_and_validation_are_local_kind() {
        assert_eq!(ApiError::Local("bad header".into()).kind(), ErrorKind::Local);
        let err: ApiError = ValidationError::MissingFields.into();
        assert_eq!(err.kind(), ErrorKind::Local);
        assert_eq!(err.user_message(), "Please fill in all fields");
    }

    #[test]
    fn test_invalid_response_is_server_responded() {
        let err = ApiError::invalid_response(StatusCode::OK, "missing generatedImageUrl");
        assert_eq!(err.kind(), ErrorKind::ServerResponded);
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert!(!err.is_timeout());
    }
}
