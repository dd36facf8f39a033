use reqwest::Request;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::HANDOFF_CAPACITY;
use crate::http::RequestTemplate;
use crate::shutdown::CancelToken;

/// Emits exactly `n` requests built from `template`, in order.
///
/// Stops early, closing its queue, once `scope` is canceled or the
/// downstream queue is gone.
pub(super) fn produce(
    n: u64,
    template: RequestTemplate,
    scope: CancelToken,
) -> (mpsc::Receiver<Request>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut emitted: u64 = 0;
        while emitted < n {
            tokio::select! {
                biased;
                () = scope.cancelled() => {
                    debug!(emitted, requested = n, "producer canceled");
                    return;
                }
                sent = tx.send(template.to_request()) => {
                    if sent.is_err() {
                        debug!(emitted, requested = n, "request queue closed");
                        return;
                    }
                }
            }
            emitted = emitted.saturating_add(1);
        }
        debug!(emitted, "producer finished");
    });
    (rx, handle)
}
