//! HTTP retrieval of CQL scripts.
//!
//! [`HttpFetcher`] issues a plain `GET` with the transport's default
//! settings. There is no retry; any failure is reported to the runner.

use cqlboot_core::FailureKind;

use crate::runner::ScriptFetcher;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from downloading a script.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, invalid URL).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("Script source returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body could not be read to completion.
    #[error("Failed to read response body: {0}")]
    Body(reqwest::Error),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Request(_) | Self::HttpStatus(_) => FailureKind::Fetch,
            Self::Body(_) => FailureKind::Read,
        }
    }
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Downloads scripts over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(FetchError::Body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
