//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::HitArgs;
pub use types::{ClientChoice, HttpMethod, OutputFormat, PositiveU64, PositiveUsize};

pub(crate) use parsers::{parse_duration_value, parse_header};
