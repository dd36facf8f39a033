use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::RunError;
use crate::http::RequestResult;
use crate::shutdown::CancelToken;

/// Lazy, single-consumer sequence of the results of one run.
///
/// Each pull waits for the next completed request. The sequence owns the
/// run: [`Results::close`] (or [`Results::consume`]) cancels whatever is
/// still running and waits until every stage and worker has exited. Only
/// those two give the join guarantee. Dropping the sequence without closing
/// it (for example on an early `?` return) cancels the run and aborts every
/// task, but cannot wait for them to finish.
///
/// Every request the pool picked up yields exactly one result, including
/// requests cut short by cancellation ([`crate::error::RequestError::Aborted`]).
/// Results arrive in completion order, not submission order.
pub struct Results {
    rx: mpsc::Receiver<RequestResult>,
    tasks: Vec<JoinHandle<()>>,
    requested: u64,
    received: u64,
    finished: bool,
    interrupt: CancelToken,
    run: CancelToken,
}

impl Results {
    pub(super) const fn new(
        rx: mpsc::Receiver<RequestResult>,
        tasks: Vec<JoinHandle<()>>,
        requested: u64,
        interrupt: CancelToken,
        run: CancelToken,
    ) -> Self {
        Self {
            rx,
            tasks,
            requested,
            received: 0,
            finished: false,
            interrupt,
            run,
        }
    }

    /// Waits for the next result; `None` once the run has ended.
    pub async fn next(&mut self) -> Option<RequestResult> {
        let next = self.rx.recv().await;
        self.observe(next)
    }

    fn observe(&mut self, next: Option<RequestResult>) -> Option<RequestResult> {
        match next {
            Some(_) => self.received = self.received.saturating_add(1),
            None => self.finished = true,
        }
        next
    }

    /// Number of requests the run was asked to send.
    #[must_use]
    pub const fn requested(&self) -> u64 {
        self.requested
    }

    /// Number of results pulled so far.
    #[must_use]
    pub const fn received(&self) -> u64 {
        self.received
    }

    /// `true` once the sequence has been exhausted.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds results to `visit` until it breaks or the run ends, then closes.
    ///
    /// # Errors
    ///
    /// Same as [`Results::close`].
    pub async fn consume<F>(mut self, mut visit: F) -> Result<u64, RunError>
    where
        F: FnMut(RequestResult) -> ControlFlow<()>,
    {
        while let Some(result) = self.next().await {
            if visit(result).is_break() {
                break;
            }
        }
        self.close().await
    }

    /// Cancels the run if it is still going and joins every task.
    ///
    /// Returns the number of results received.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Cancelled`] when the caller's scope or the
    /// deadline canceled the run before all requested results arrived.
    /// Stopping early on the consumer side is not an error.
    pub async fn close(mut self) -> Result<u64, RunError> {
        if !self.finished {
            debug!(
                received = self.received,
                requested = self.requested,
                "results closed early: canceling run"
            );
        }
        self.run.cancel();
        self.rx.close();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(err) = task.await {
                warn!("Pipeline task failed: {}", err);
            }
        }
        debug!(received = self.received, "pipeline closed");

        if self.received < self.requested && self.interrupt.is_cancelled() {
            return Err(RunError::Cancelled {
                completed: self.received,
                requested: self.requested,
            });
        }
        Ok(self.received)
    }
}

impl Stream for Results {
    type Item = RequestResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let next = ready!(this.rx.poll_recv(cx));
        Poll::Ready(this.observe(next))
    }
}

impl Drop for Results {
    fn drop(&mut self) {
        self.run.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }
}
