use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain a candle from the exchange.
///
/// Any variant is fatal to a watch run; the variants exist so call sites
/// can tell a bad symbol (HTTP 400) apart from a network problem.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("exchange returned HTTP {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("klines payload is not an array of arrays: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("exchange returned no candles")]
    Empty,

    #[error("malformed candle row: {0}")]
    MalformedCandle(String),
}

impl FetchError {
    /// HTTP status when the exchange answered with a non-success code
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// True when the payload arrived but could not be turned into a candle
    pub fn is_payload(&self) -> bool {
        matches!(
            self,
            FetchError::Decode(_) | FetchError::Empty | FetchError::MalformedCandle(_)
        )
    }
}
