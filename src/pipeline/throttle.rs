use std::time::Duration;

use reqwest::Request;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use super::HANDOFF_CAPACITY;
use crate::shutdown::CancelToken;

/// Forwards requests no faster than one per `period`.
///
/// The first request waits a full period. Spacing follows a ticker, so it is
/// approximate; a late tick delays the schedule instead of bursting to catch
/// up.
pub(super) fn throttle(
    mut input: mpsc::Receiver<Request>,
    period: Duration,
    scope: CancelToken,
) -> (mpsc::Receiver<Request>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    let handle = tokio::spawn(async move {
        let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut forwarded: u64 = 0;

        loop {
            let request = tokio::select! {
                biased;
                () = scope.cancelled() => break,
                next = input.recv() => match next {
                    Some(request) => request,
                    None => break,
                },
            };
            tokio::select! {
                biased;
                () = scope.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                () = scope.cancelled() => break,
                sent = tx.send(request) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
            forwarded = forwarded.saturating_add(1);
        }
        debug!(
            forwarded,
            period_us = period.as_micros(),
            canceled = scope.is_cancelled(),
            "throttler stopped"
        );
    });
    (rx, handle)
}
