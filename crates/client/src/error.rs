use reqwest::Method;
use thiserror::Error;

/// Failures for which the server produced no response to normalize.
///
/// Anything the server answered, including 4xx/5xx, is returned as
/// [`ApiResponse::Failure`](crate::ApiResponse::Failure) instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
