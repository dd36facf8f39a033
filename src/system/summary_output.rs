use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::summary::Summary;

#[derive(Debug, Serialize)]
struct JsonSummary {
    success_rate: f64,
    achieved_rate: f64,
    total_requests: u64,
    error_count: u64,
    total_bytes: u64,
    duration_us: u64,
    fastest_us: u64,
    slowest_us: u64,
    p50_us: u64,
    p90_us: u64,
    p99_us: u64,
}

impl From<&Summary> for JsonSummary {
    fn from(summary: &Summary) -> Self {
        Self {
            success_rate: summary.success_rate,
            achieved_rate: summary.achieved_rate,
            total_requests: summary.total_requests,
            error_count: summary.error_count,
            total_bytes: summary.total_bytes,
            duration_us: micros(summary.total_duration),
            fastest_us: micros(summary.fastest),
            slowest_us: micros(summary.slowest),
            p50_us: micros(summary.latency.p50),
            p90_us: micros(summary.latency.p90),
            p99_us: micros(summary.latency.p99),
        }
    }
}

pub(crate) fn write_summary<W: Write>(
    out: &mut W,
    summary: &Summary,
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(summary) {
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &JsonSummary::from(summary))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub(crate) fn summary_lines(summary: &Summary) -> Vec<String> {
    vec![
        String::new(),
        "Summary:".to_owned(),
        format!("    Success  : {:.0}%", summary.success_rate),
        format!("    RPS      : {:.1}", summary.achieved_rate),
        format!("    Requests : {}", summary.total_requests),
        format!("    Errors   : {}", summary.error_count),
        format!("    Bytes    : {}", summary.total_bytes),
        format!("    Duration : {:?}", millis(summary.total_duration)),
        format!("    Fastest  : {:?}", millis(summary.fastest)),
        format!("    Slowest  : {:?}", millis(summary.slowest)),
        format!(
            "    Latency  : p50 {:?} | p90 {:?} | p99 {:?}",
            millis(summary.latency.p50),
            millis(summary.latency.p90),
            millis(summary.latency.p99)
        ),
    ]
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Truncates to whole milliseconds for display.
fn millis(duration: Duration) -> Duration {
    Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
