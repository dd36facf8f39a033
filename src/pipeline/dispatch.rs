use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Request;
use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use super::HANDOFF_CAPACITY;
use crate::error::RequestError;
use crate::http::{RequestResult, RequestSender};
use crate::shutdown::CancelToken;

type SharedInput = Arc<Mutex<mpsc::Receiver<Request>>>;

/// Fans requests out to exactly `concurrency` workers.
///
/// Each worker sends one request at a time, so at most `concurrency` sends
/// are in flight. The result queue closes only after every worker has been
/// joined. Aborting the returned task aborts the workers with it.
pub(super) fn dispatch(
    input: mpsc::Receiver<Request>,
    concurrency: NonZeroUsize,
    sender: Arc<dyn RequestSender>,
    scope: CancelToken,
) -> (mpsc::Receiver<RequestResult>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let input: SharedInput = Arc::new(Mutex::new(input));

    let handle = tokio::spawn(async move {
        let mut workers = JoinSet::new();
        for id in 0..concurrency.get() {
            workers.spawn(run_worker(
                id,
                Arc::clone(&input),
                Arc::clone(&sender),
                tx.clone(),
                scope.clone(),
            ));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!("Dispatch worker failed: {}", err);
            }
        }
        drop(tx);
        debug!(workers = concurrency.get(), "dispatcher drained");
    });
    (rx, handle)
}

async fn run_worker(
    id: usize,
    input: SharedInput,
    sender: Arc<dyn RequestSender>,
    out: mpsc::Sender<RequestResult>,
    scope: CancelToken,
) {
    let mut handled: u64 = 0;
    loop {
        let next = tokio::select! {
            biased;
            () = scope.cancelled() => None,
            next = next_request(&input) => next,
        };
        let Some(request) = next else {
            break;
        };

        // Run cancellation aborts the exchange at its next await point, but
        // every dispatched request still yields exactly one result.
        let started = Instant::now();
        let result = tokio::select! {
            biased;
            () = scope.cancelled() => {
                debug!(worker = id, "in-flight request aborted");
                RequestResult::failed(RequestError::Aborted, started.elapsed())
            }
            result = sender.send(request) => result,
        };

        // Only a closed result queue stops the forward.
        if out.send(result).await.is_err() {
            break;
        }
        handled = handled.saturating_add(1);
    }
    debug!(worker = id, handled, "worker stopped");
}

async fn next_request(input: &Mutex<mpsc::Receiver<Request>>) -> Option<Request> {
    input.lock().await.recv().await
}
