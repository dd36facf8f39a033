//! Core library for the `hit` HTTP load generator.
//!
//! [`send_n`] sends a fixed number of copies of one request through a
//! producer, an optional throttler and a bounded worker pool, each running as
//! its own task. The returned [`Results`] is a lazy, single-consumer sequence
//! that owns the run: closing or dropping it cancels whatever is still in
//! flight. [`summarize`] folds a sequence into a [`Summary`].
//!
//! The `hit` command-line application wraps this API; the argument and
//! configuration types are exposed so the binary stays thin.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod pipeline;
pub mod shutdown;
pub mod summary;

mod entry;
mod shutdown_handlers;
mod system;

#[cfg(test)]
mod test_support;

pub use entry::run;
pub use http::{
    ClientSender, ClientTuning, FnSender, RequestResult, RequestSender, RequestTemplate, send,
};
pub use options::{Options, ResolvedOptions};
pub use pipeline::{Results, send_n};
pub use shutdown::CancelToken;
pub use summary::{LatencyPercentiles, Summary, SummaryBuilder, summarize};
