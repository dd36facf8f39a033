use tracing::{info, warn};

use crate::shutdown::CancelToken;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels `token` on Ctrl-C (and SIGTERM on unix).
///
/// The handler exits on its own once `token` is canceled from elsewhere.
#[must_use]
pub fn setup_signal_shutdown_handler(token: &CancelToken) -> tokio::task::JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = token.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received: stopping run");
                    token.cancel();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("SIGTERM received: stopping run");
                    token.cancel();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = token.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received: stopping run");
                    token.cancel();
                }
            }
        }
    })
}
