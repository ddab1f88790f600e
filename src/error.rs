/// Canonical error type used across all modules.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Auth error: {0}")]
    Auth(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("API error: status={status}, message={message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Broad error category derived from the failure kind or HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    Authentication,
    Permission,
    RateLimit,
    ServerError,
    Unknown,
}

/// Map a backend HTTP status code to an error category.
#[must_use]
pub fn category_from_status(status: u16) -> ErrorCategory {
    match status {
        400 => ErrorCategory::InvalidRequest,
        401 => ErrorCategory::Authentication,
        403 => ErrorCategory::Permission,
        429 => ErrorCategory::RateLimit,
        500..=599 => ErrorCategory::ServerError,
        _ => ErrorCategory::Unknown,
    }
}

impl ClientError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            ClientError::Auth(_) => ErrorCategory::Authentication,
            ClientError::Config(_) | ClientError::Transport(_) | ClientError::Decode(_) => {
                ErrorCategory::ServerError
            }
            ClientError::Api { status, .. } => category_from_status(*status),
        }
    }

    /// Build the error for a non-success backend response.
    ///
    /// Prefers the backend envelope's `error` message; falls back to the
    /// canonical status reason. A 401 is folded into `Auth` so session
    /// expiry is distinguishable from ordinary API failures.
    #[must_use]
    pub(crate) fn from_response_status(status: http::StatusCode, body_error: Option<String>) -> Self {
        let message = body_error.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        if status == http::StatusCode::UNAUTHORIZED {
            ClientError::Auth(message)
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}
