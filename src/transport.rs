//! HTTP transport used for every upstream request.
//!
//! The [`HttpTransport`] trait is the seam between the fetch/session logic and
//! the network. [`ReqwestTransport`] is the production implementation: a
//! blocking `reqwest` client with a cookie store, so cookies set while the
//! session is acquired are replayed on the download request.

use crate::config;
use crate::error::{ProjectionError, Result};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Status and body of a completed upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues `GET` requests against the upstream provider.
///
/// An `Err` means the request could not be completed at all (connect error,
/// timeout, body read failure). Non-success statuses are *not* errors; they
/// come back as an [`UpstreamResponse`] for the caller to interpret.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<UpstreamResponse>;
}

/// Blocking `reqwest` transport with a shared cookie store and bounded timeout.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(config::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<UpstreamResponse> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let body = resp.text()?;
        Ok(UpstreamResponse { status, body })
    }
}

/// Parse `base` and append `segments` as percent-encoded path segments.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ProjectionError::InvalidArgument(format!("invalid base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ProjectionError::InvalidArgument(format!("base URL {base} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
