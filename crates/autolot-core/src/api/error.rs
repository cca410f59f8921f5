use reqwest::StatusCode;
use thiserror::Error;

use crate::ports::Notification;

/// Shown once for any transport-level failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Shown once when the server rejects the stored token
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered 401 to an authenticated request. The session has
    /// already been cleared and the user notified.
    #[error("Session expired")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| format!("Status {}: {}", status, Self::truncate_body(body)));
        ApiError::Rejected { status, message }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Notification a caller should still show for this error. `None` when
    /// the client has already told the user: expired sessions and network
    /// failures.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            ApiError::SessionExpired | ApiError::Network(_) => None,
            other => Some(Notification::error(other.to_string())),
        }
    }
}

/// Human readable message from an error body, if the server sent one.
/// Understands `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}` and
/// `{"message": "..."}`.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => return Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            if let Some(msg) = items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(|msg| msg.as_str())
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_shapes() {
        assert_eq!(
            server_message(r#"{"detail": "Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            server_message(r#"{"detail": [{"loc": ["body", "email"], "msg": "field required"}]}"#)
                .as_deref(),
            Some("field required")
        );
        assert_eq!(
            server_message(r#"{"message": "Email already registered"}"#).as_deref(),
            Some("Email already registered")
        );
        assert_eq!(server_message("<html>Bad Gateway</html>"), None);
        assert_eq!(server_message(r#"{"error": true}"#), None);
    }

    #[test]
    fn test_from_status_prefers_server_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Bad make id"}"#);
        assert_eq!(err.to_string(), "Bad make id");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "Status 502 Bad Gateway: upstream down");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("(truncated, {} total bytes)", long.len())));

        // Never splits a multi-byte character
        let wide = "é".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&wide).contains("truncated"));
    }

    #[test]
    fn test_session_expired_has_no_notification() {
        assert!(ApiError::SessionExpired.notification().is_none());
        assert!(ApiError::SessionExpired.is_session_expired());

        let rejected = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"detail": "Admins only"}"#);
        assert_eq!(
            rejected.notification(),
            Some(Notification::error("Admins only"))
        );
        assert!(!rejected.is_session_expired());
    }
}
