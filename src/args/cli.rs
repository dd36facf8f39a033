use clap::Parser;
use std::time::Duration;

use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize,
};
use super::types::{ClientChoice, HttpMethod, OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "hit",
    version,
    about = "Sends a fixed number of HTTP requests with bounded concurrency and an optional rate limit, then summarizes the results.",
    next_help_heading = "Advanced Options"
)]
pub struct HitArgs {
    /// Target URL (scheme and host required)
    #[arg(help_heading = "Common Options")]
    pub url: Option<String>,

    /// Number of requests to send
    #[arg(
        long,
        short = 'n',
        default_value = "100",
        value_parser = parse_positive_u64,
        help_heading = "Common Options"
    )]
    pub requests: PositiveU64,

    /// Number of concurrent workers
    #[arg(
        long,
        short = 'c',
        default_value = "1",
        value_parser = parse_positive_usize,
        help_heading = "Common Options"
    )]
    pub concurrency: PositiveUsize,

    /// Requests per second across all workers (unlimited when omitted)
    #[arg(long = "rps", value_parser = parse_positive_u64, help_heading = "Common Options")]
    pub rps: Option<PositiveU64>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Request timeout of the tuned client (e.g. 500ms, 10s)
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Stop the run once this much time has passed (e.g. 30s, 2m)
    #[arg(long, value_parser = parse_duration_arg)]
    pub deadline: Option<Duration>,

    /// HTTP client tuning
    #[arg(long, value_enum, default_value = "default")]
    pub client: ClientChoice,

    /// Summary output format
    #[arg(long = "output-format", value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Path to config file (TOML/JSON). Defaults to ./hit.toml or ./hit.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Print the run plan and exit without sending requests
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by HIT_LOG/RUST_LOG)
    #[arg(long, short = 'v', alias = "debug")]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
