use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Could not reach the server: {0}")]
    Unreachable(String),
}

/// Error envelope the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Prefer a structured backend `message`/`error` field over a generic
/// status-derived string.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }
    format!("Request failed with status {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_backend_message_field() {
        let body = r#"{"success":false,"message":"Playlist not found"}"#;
        assert_eq!(error_message(404, body), "Playlist not found");
    }

    #[test]
    fn falls_back_to_error_field() {
        let body = r#"{"success":false,"error":"rate limited"}"#;
        assert_eq!(error_message(429, body), "rate limited");
    }

    #[test]
    fn generic_message_when_body_is_unstructured() {
        assert_eq!(
            error_message(500, "<html>oops</html>"),
            "Request failed with status 500"
        );
        assert_eq!(error_message(502, ""), "Request failed with status 502");
    }
}
