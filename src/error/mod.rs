//! Error types for the load generator and its CLI.
//!
//! Only [`ConfigurationError`] and [`RunError`] cross the public pipeline
//! API. Per-request failures are data: they travel inside a
//! [`crate::http::RequestResult`] as a [`RequestError`].
mod app;
mod config;
mod http;
mod run;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::RequestError;
pub use run::{ConfigurationError, RunError};
pub use validation::ValidationError;
