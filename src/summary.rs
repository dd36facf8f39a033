//! Aggregate statistics over a finished run.
//!
//! Pure, single-pass reduction: no concurrency and no cancellation.
use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};
use hdrhistogram::Histogram;

use crate::http::RequestResult;

/// Significant figures kept by the latency histogram.
const HISTOGRAM_SIGFIG: u8 = 3;

/// Latency percentiles of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
}

/// Aggregate view of a run. Holds no reference to the results it was built
/// from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Share of requests without error and with status < 400, in percent.
    pub success_rate: f64,
    /// Requests per second over [`Summary::total_duration`].
    pub achieved_rate: f64,
    pub total_requests: u64,
    pub error_count: u64,
    pub total_bytes: u64,
    /// Wall-clock span from the dispatch of the first observed result to the
    /// observation of the last one.
    pub total_duration: Duration,
    pub fastest: Duration,
    pub slowest: Duration,
    pub latency: LatencyPercentiles,
}

impl Summary {
    /// Summarizes an already collected sequence.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = RequestResult>,
    {
        let mut builder = SummaryBuilder::new();
        for result in results {
            builder.record(&result);
        }
        builder.finish()
    }
}

/// Consumes `results` to exhaustion and summarizes them.
///
/// Accepts `&mut Results`, so the caller can still close the run afterwards.
pub async fn summarize<S>(mut results: S) -> Summary
where
    S: Stream<Item = RequestResult> + Unpin,
{
    let mut builder = SummaryBuilder::new();
    while let Some(result) = results.next().await {
        builder.record(&result);
    }
    builder.finish()
}

/// Incremental accumulator behind [`Summary`].
#[derive(Debug)]
pub struct SummaryBuilder {
    total: u64,
    successes: u64,
    errors: u64,
    bytes: u64,
    fastest: Option<Duration>,
    slowest: Duration,
    started: Option<Instant>,
    last_seen: Option<Instant>,
    latency: Option<Histogram<u64>>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            total: 0,
            successes: 0,
            errors: 0,
            bytes: 0,
            fastest: None,
            slowest: Duration::ZERO,
            started: None,
            last_seen: None,
            latency: Histogram::new(HISTOGRAM_SIGFIG).ok(),
        }
    }

    pub fn record(&mut self, result: &RequestResult) {
        let now = Instant::now();
        if self.started.is_none() {
            self.started = Some(now.checked_sub(result.duration).unwrap_or(now));
        }
        self.last_seen = Some(now);

        self.total = self.total.saturating_add(1);
        if result.error.is_some() {
            self.errors = self.errors.saturating_add(1);
        }
        if result.is_success() {
            self.successes = self.successes.saturating_add(1);
        }
        self.bytes = self.bytes.saturating_add(result.bytes);
        self.fastest = Some(
            self.fastest
                .map_or(result.duration, |fastest| fastest.min(result.duration)),
        );
        self.slowest = self.slowest.max(result.duration);
        if let Some(histogram) = self.latency.as_mut() {
            let micros = u64::try_from(result.duration.as_micros()).unwrap_or(u64::MAX);
            histogram.saturating_record(micros.max(1));
        }
    }

    #[must_use]
    pub fn finish(self) -> Summary {
        let total_duration = match (self.started, self.last_seen) {
            (Some(started), Some(last_seen)) => last_seen.saturating_duration_since(started),
            _ => Duration::ZERO,
        };
        Summary {
            success_rate: percentage(self.successes, self.total),
            achieved_rate: per_second(self.total, total_duration),
            total_requests: self.total,
            error_count: self.errors,
            total_bytes: self.bytes,
            total_duration,
            fastest: self.fastest.unwrap_or_default(),
            slowest: self.slowest,
            latency: self
                .latency
                .as_ref()
                .map(percentiles)
                .unwrap_or_default(),
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "summary rates are reported as floating point"
)]
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

#[expect(
    clippy::float_arithmetic,
    reason = "summary rates are reported as floating point"
)]
fn per_second(count: u64, span: Duration) -> f64 {
    let seconds = span.as_secs_f64();
    if seconds <= 0.0 {
        return 0.0;
    }
    count as f64 / seconds
}

fn percentiles(histogram: &Histogram<u64>) -> LatencyPercentiles {
    if histogram.len() == 0 {
        return LatencyPercentiles::default();
    }
    LatencyPercentiles {
        p50: Duration::from_micros(histogram.value_at_quantile(0.5)),
        p90: Duration::from_micros(histogram.value_at_quantile(0.9)),
        p99: Duration::from_micros(histogram.value_at_quantile(0.99)),
    }
}
