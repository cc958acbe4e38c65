//! Errors surfaced by the marketplace API client

use serde::Deserialize;

/// Failure of a single backend call. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: DNS, connection refused, TLS, broken body
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 401
    #[error("{}", ApiError::UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    /// Any other non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Success status but the body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Error body shapes the backend is known to send
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Fixed text for authentication failures
    pub const UNAUTHORIZED_MESSAGE: &'static str = "Invalid credentials. Please check them and try again.";

    const NETWORK_MESSAGE: &'static str = "Could not reach the server. Check your connection and try again.";

    const INVALID_RESPONSE_MESSAGE: &'static str = "The server sent an unexpected response. Please try again.";

    /// Classify a non-success response.
    ///
    /// 401 always maps to [`ApiError::Unauthorized`]. Otherwise the payload's
    /// `message` (or `error`) field is passed through, falling back to
    /// `fallback` when the body carries neither.
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
        let message = payload
            .message
            .or(payload.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        ApiError::Server { status, message }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Text to show the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => Self::NETWORK_MESSAGE.to_string(),
            ApiError::Unauthorized => Self::UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::InvalidResponse(_) => Self::INVALID_RESPONSE_MESSAGE.to_string(),
            ApiError::InvalidBaseUrl(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "Error loading tools.";

    #[test]
    fn test_401_is_fixed_message() {
        let err = ApiError::from_response(401, r#"{"message":"jwt expired"}"#, FALLBACK);
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), ApiError::UNAUTHORIZED_MESSAGE);
        assert_eq!(err.to_string(), ApiError::UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn test_payload_message_passes_through() {
        let err = ApiError::from_response(409, r#"{"message":"Tool already reserved"}"#, FALLBACK);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Tool already reserved");
    }

    #[test]
    fn test_error_field_is_accepted() {
        let err = ApiError::from_response(400, r#"{"error":"Email already in use"}"#, FALLBACK);
        assert_eq!(err.user_message(), "Email already in use");
    }

    #[test]
    fn test_fallback_when_body_has_no_message() {
        for body in ["", "<html>Bad Gateway</html>", "{}", r#"{"message":"  "}"#, "[]"] {
            let err = ApiError::from_response(502, body, FALLBACK);
            assert_eq!(err.user_message(), FALLBACK, "body: {:?}", body);
        }
    }

    #[test]
    fn test_invalid_response_has_generic_user_message() {
        let err = ApiError::InvalidResponse("missing field `id`".to_string());
        assert!(err.to_string().contains("missing field"));
        assert!(!err.user_message().contains("missing field"));
        assert_eq!(err.status(), None);
    }
}
