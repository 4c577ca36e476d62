use thiserror::Error;

/// Client-side error taxonomy.
///
/// Nothing here is allowed to crash the caller's UI tree: every operation
/// returns `Result` and the host degrades to an error/toast state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server-provided message when one
    /// was present, generic HTTP status text otherwise.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(String),

    /// No usable session: there were no tokens, or the single transparent
    /// refresh failed and the local session was cleared.
    #[error("session expired, sign in again")]
    SessionExpired,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }
}

/// Fallback message for responses that carry no server message.
pub(crate) fn status_text(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Request Failed",
    }
}
