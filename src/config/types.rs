use std::time::Duration;

use serde::Deserialize;

use crate::args::{ClientChoice, HttpMethod, OutputFormat, parse_duration_value};
use crate::error::ValidationError;

/// Contents of `hit.toml` / `hit.json`. Every field is optional; command-line
/// values take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    #[serde(alias = "rate")]
    pub rps: Option<u64>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub timeout: Option<DurationValue>,
    pub deadline: Option<DurationValue>,
    pub client: Option<ClientChoice>,
    pub output_format: Option<OutputFormat>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// A duration written either as whole seconds or as text such as `"250ms"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
