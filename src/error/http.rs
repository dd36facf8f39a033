use thiserror::Error;

/// Failure of a single request/response exchange.
///
/// Cloneable so that a [`crate::http::RequestResult`] stays a plain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request timed out: {message}")]
    Timeout { message: String },
    #[error("Connection failed: {message}")]
    Connect { message: String },
    #[error("Request failed: {message}")]
    Transport { message: String },
    #[error("Failed to read response body: {message}")]
    Body { message: String },
    #[error("Request aborted by run cancellation.")]
    Aborted,
    #[error("{message}")]
    Other { message: String },
}

impl RequestError {
    /// Classifies a client error raised while sending the request.
    #[must_use]
    pub fn from_send(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout { message }
        } else if err.is_connect() {
            RequestError::Connect { message }
        } else {
            RequestError::Transport { message }
        }
    }

    /// Classifies a client error raised while draining the response body.
    #[must_use]
    pub fn from_body(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout { message }
        } else {
            RequestError::Body { message }
        }
    }

    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        RequestError::Other {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }
}
