use std::num::NonZeroUsize;
use std::time::Duration;

use reqwest::{Client, redirect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigurationError;

/// Fixed request timeout of the tuned client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const USER_AGENT: &str = concat!("hit/", env!("CARGO_PKG_VERSION"));

/// Selects the HTTP client used by the default sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientTuning {
    /// Same as [`ClientTuning::Enabled`].
    #[default]
    Default,
    /// Stock `reqwest` client: default pool, follows redirects, no timeout.
    Disabled,
    /// Idle pool bounded by the concurrency, redirects disabled, fixed timeout.
    Enabled,
}

/// Builds the client selected by `tuning`.
///
/// # Errors
///
/// Returns an error when the TLS backend or resolver cannot be initialized.
pub fn build_client(
    tuning: ClientTuning,
    concurrency: NonZeroUsize,
    timeout: Duration,
) -> Result<Client, ConfigurationError> {
    let builder = match tuning {
        ClientTuning::Default | ClientTuning::Enabled => {
            debug!(
                idle_per_host = concurrency.get(),
                timeout_ms = timeout.as_millis(),
                "tuned client requested: bounding idle pool and disabling redirects"
            );
            Client::builder()
                .pool_max_idle_per_host(concurrency.get())
                .redirect(redirect::Policy::none())
                .timeout(timeout)
        }
        ClientTuning::Disabled => {
            debug!("using default http client");
            Client::builder()
        }
    };
    builder
        .user_agent(USER_AGENT)
        .build()
        .map_err(|source| ConfigurationError::BuildClient { source })
}
