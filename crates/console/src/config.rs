use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const API_URL_VAR: &str = "GRAPHRAG_API_URL";
pub const LOG_FORMAT_VAR: &str = "GRAPHRAG_LOG_FORMAT";
pub const WRAP_WIDTH_VAR: &str = "GRAPHRAG_WRAP_WIDTH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend base URL, read once at start-up.
    pub api_url: String,
    pub log_format: LogFormat,
    /// Column at which source excerpts wrap.
    pub wrap_width: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty, // Human-readable lines on stderr
    Json,   // One JSON object per event
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}` (expected pretty or json)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: client::DEFAULT_BASE_URL.to_string(),
            log_format: LogFormat::Pretty,
            wrap_width: 100,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their
    /// defaults and unparsable ones are reported and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        Self {
            api_url,
            log_format: parse_or(&lookup, LOG_FORMAT_VAR, defaults.log_format),
            wrap_width: parse_or(&lookup, WRAP_WIDTH_VAR, defaults.wrap_width).max(20),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                // Logging is not initialised yet when the config is read.
                eprintln!("Invalid value '{val}' for {var}: {e}. Using default.");
                default
            }
        },
        None => default,
    }
}
