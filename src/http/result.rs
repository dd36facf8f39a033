use std::time::Duration;

use crate::error::RequestError;

/// Outcome of one dispatched request.
///
/// Produced exactly once per request that reached a worker. A transport
/// failure leaves `status` and `bytes` at zero; a failure while draining the
/// body keeps the status and the bytes read before the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    pub status: u16,
    pub bytes: u64,
    pub duration: Duration,
    pub error: Option<RequestError>,
}

impl RequestResult {
    #[must_use]
    pub const fn completed(status: u16, bytes: u64, duration: Duration) -> Self {
        Self {
            status,
            bytes,
            duration,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(error: RequestError, duration: Duration) -> Self {
        Self {
            status: 0,
            bytes: 0,
            duration,
            error: Some(error),
        }
    }

    /// No error and a non-error status code (< 400).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.status < 400
    }
}
