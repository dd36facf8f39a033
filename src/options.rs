//! Run configuration and its defaulting pass.
use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::http::{ClientSender, ClientTuning, DEFAULT_TIMEOUT, RequestSender, build_client};

/// Options for one run. Unset fields are filled by [`Options::resolve`].
#[derive(Clone, Default)]
pub struct Options {
    /// Number of concurrent workers. `0` runs sequentially (one worker).
    pub concurrency: usize,
    /// Target requests per second. `0` disables pacing.
    pub rate_per_second: u64,
    /// Processes each request. Defaults to [`ClientSender`] over the client
    /// selected by `client_tuning`.
    pub sender: Option<Arc<dyn RequestSender>>,
    /// Ignored when `sender` is set.
    pub client_tuning: ClientTuning,
    /// Request timeout of the tuned client. Defaults to [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Cancels the run once elapsed, like an external interrupt.
    pub deadline: Option<Duration>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("concurrency", &self.concurrency)
            .field("rate_per_second", &self.rate_per_second)
            .field("sender", &self.sender.as_ref().map(|_| "custom"))
            .field("client_tuning", &self.client_tuning)
            .field("timeout", &self.timeout)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Fully defaulted options; the single source of truth for a run.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub concurrency: NonZeroUsize,
    pub rate_per_second: Option<NonZeroU64>,
    pub sender: Arc<dyn RequestSender>,
    pub deadline: Option<Duration>,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("concurrency", &self.concurrency)
            .field("rate_per_second", &self.rate_per_second)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Resolves the default options.
    ///
    /// # Errors
    ///
    /// Returns an error when the default HTTP client cannot be built.
    pub fn defaults() -> Result<ResolvedOptions, ConfigurationError> {
        Self::default().resolve()
    }

    /// Fills every unset field.
    ///
    /// # Errors
    ///
    /// Returns an error when no sender is given and the HTTP client cannot
    /// be built.
    pub fn resolve(self) -> Result<ResolvedOptions, ConfigurationError> {
        let concurrency = NonZeroUsize::new(self.concurrency).unwrap_or_else(|| {
            warn!("zero concurrency requested: running sequentially");
            NonZeroUsize::MIN
        });

        let sender = match self.sender {
            Some(sender) => sender,
            None => {
                debug!("no sender provided: using the default client sender");
                let client = build_client(
                    self.client_tuning,
                    concurrency,
                    self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                )?;
                Arc::new(ClientSender::new(client)) as Arc<dyn RequestSender>
            }
        };

        Ok(ResolvedOptions {
            concurrency,
            rate_per_second: NonZeroU64::new(self.rate_per_second),
            sender,
            deadline: self.deadline,
        })
    }
}
