//! The request pipeline: producer, optional throttler and dispatcher.
//!
//! Every stage runs as its own tokio task and hands work to the next one over
//! a capacity-1 channel, so a slow stage blocks its upstream instead of
//! buffering. All stages of a run observe the same [`CancelToken`]; the
//! queues are the only other shared state.
//!
//! Results leave the dispatcher in completion order, which is not the
//! submission order once more than one worker is running.
mod dispatch;
mod produce;
mod results;
mod throttle;


use std::num::NonZeroU64;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::http::{RequestResult, RequestTemplate};
use crate::options::{Options, ResolvedOptions};
use crate::shutdown::CancelToken;

use dispatch::dispatch;
use produce::produce;
use throttle::throttle;

pub use results::Results;

/// Capacity of every stage-to-stage queue.
const HANDOFF_CAPACITY: usize = 1;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Sends `n` copies of `template` and returns the lazily consumed results.
///
/// `scope` is the caller's cancellation handle (for example wired to Ctrl-C);
/// canceling it interrupts the run. The run itself uses child tokens, so
/// abandoning the returned [`Results`] never cancels `scope`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error when `n` is zero or the default HTTP client cannot be
/// built. No task is started in that case.
pub fn send_n(
    scope: &CancelToken,
    n: u64,
    template: RequestTemplate,
    options: Options,
) -> Result<Results, ConfigurationError> {
    if n == 0 {
        return Err(ConfigurationError::InvalidCount { n });
    }
    let options = options.resolve()?;

    let interrupt = scope.child();
    let run = interrupt.child();
    let mut tasks = Vec::with_capacity(4);
    if let Some(deadline) = options.deadline {
        tasks.push(watch_deadline(deadline, interrupt.clone(), run.clone()));
    }

    debug!(
        requests = n,
        concurrency = options.concurrency.get(),
        rate_per_second = options.rate_per_second.map_or(0, NonZeroU64::get),
        "starting pipeline"
    );
    let (results, stages) = run_pipeline(n, template, &options, &run);
    tasks.extend(stages);

    Ok(Results::new(results, tasks, n, interrupt, run))
}

fn run_pipeline(
    n: u64,
    template: RequestTemplate,
    options: &ResolvedOptions,
    scope: &CancelToken,
) -> (mpsc::Receiver<RequestResult>, Vec<JoinHandle<()>>) {
    let mut tasks = Vec::with_capacity(3);

    let (requests, producer) = produce(n, template, scope.clone());
    tasks.push(producer);

    let requests = match options.rate_per_second {
        Some(rate) => {
            let (paced, throttler) = throttle(requests, pacing_interval(rate), scope.clone());
            tasks.push(throttler);
            paced
        }
        None => requests,
    };

    let (results, dispatcher) = dispatch(
        requests,
        options.concurrency,
        options.sender.clone(),
        scope.clone(),
    );
    tasks.push(dispatcher);

    (results, tasks)
}

/// Interval between two forwarded requests at `rate` requests per second.
fn pacing_interval(rate: NonZeroU64) -> Duration {
    let nanos = NANOS_PER_SEC.checked_div(rate.get()).unwrap_or(1).max(1);
    Duration::from_nanos(nanos)
}

fn watch_deadline(deadline: Duration, interrupt: CancelToken, run: CancelToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(deadline) => {
                debug!(deadline_ms = deadline.as_millis(), "run deadline elapsed");
                interrupt.cancel();
            }
            () = run.cancelled() => {}
        }
    })
}
