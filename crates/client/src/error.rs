use thiserror::Error;

/// Why a backend call did not produce a usable body. Callers in the console
/// treat every variant as the same "request failed" outcome; the variant and
/// its fields exist for the log line.
#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestFailure {
    pub fn url(&self) -> &str {
        match self {
            RequestFailure::Transport { url, .. }
            | RequestFailure::Status { url, .. }
            | RequestFailure::Decode { url, .. } => url,
        }
    }

    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestFailure::Transport { .. } => "transport",
            RequestFailure::Status { .. } => "status",
            RequestFailure::Decode { .. } => "decode",
        }
    }
}
