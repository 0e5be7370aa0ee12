//! Historical price download with session refresh.
//!
//! A fetch takes the session token, issues one download request, and on an
//! unauthorized response refreshes the session and retries exactly once.
//! Every upstream failure ends as "no data" (`Ok(None)`); only invalid
//! arguments are returned as errors.

use crate::config;
use crate::error::{ProjectionError, Result};
use crate::session::SharedSession;
use crate::transport::{self, HttpTransport, UpstreamResponse};
use chrono::{NaiveDate, NaiveTime};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct HistoricalDataFetcher {
    transport: Arc<dyn HttpTransport>,
    session: SharedSession,
    base_url: String,
}

impl HistoricalDataFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, session: SharedSession) -> Self {
        Self {
            transport,
            session,
            base_url: config::DOWNLOAD_BASE.to_string(),
        }
    }

    /// Point downloads at a different host (e.g. a local stub server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Download the raw daily price CSV for `symbol` between `from` and `to`.
    ///
    /// Returns `Ok(None)` when the symbol has no data, the session cannot be
    /// refreshed, the retry is still unauthorized, or the request fails.
    pub fn fetch(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<Option<String>> {
        if symbol.trim().is_empty() {
            return Err(ProjectionError::InvalidArgument(
                "symbol must not be empty".into(),
            ));
        }
        if from > to {
            return Err(ProjectionError::InvalidArgument(format!(
                "start date {from} is after end date {to}"
            )));
        }

        info!(symbol, %from, %to, "acquiring price data");

        let Some(token) = self.session_token(symbol, None) else {
            return Ok(None);
        };
        let url = self.download_url(symbol, from, to, &token)?;
        let Some(mut response) = self.get(symbol, &url) else {
            return Ok(None);
        };

        if response.status == StatusCode::UNAUTHORIZED {
            debug!(symbol, "unauthorized response, refreshing session");
            let Some(token) = self.session_token(symbol, Some(&token)) else {
                return Ok(None);
            };
            let url = self.download_url(symbol, from, to, &token)?;
            info!(symbol, "retrying download after unauthorized response");
            response = match self.get(symbol, &url) {
                Some(response) => response,
                None => return Ok(None),
            };
        }

        Ok(content(symbol, response))
    }

    /// Read the session token. When `rejected` is the token an unauthorized
    /// response was issued for, and the session still holds it, the session
    /// is invalidated first. A token another request already refreshed is
    /// reused. The lock is held across invalidate, acquire and read.
    fn session_token(&self, symbol: &str, rejected: Option<&str>) -> Option<String> {
        let mut session = match self.session.lock() {
            Ok(session) => session,
            Err(_) => {
                error!(symbol, "session lock poisoned");
                return None;
            }
        };

        if let Some(rejected) = rejected {
            if session.token().unwrap_or_default() == rejected {
                session.invalidate();
            } else {
                debug!(symbol, "session already refreshed by another request");
            }
        }
        if let Err(e) = session.acquire(symbol) {
            warn!(symbol, error = %e, "could not acquire session token, continuing without one");
        }
        Some(session.token().unwrap_or_default().to_string())
    }

    fn get(&self, symbol: &str, url: &Url) -> Option<UpstreamResponse> {
        match self.transport.get(url.as_str()) {
            Ok(response) => Some(response),
            Err(e) => {
                error!(symbol, error = %e, "could not fetch price data");
                None
            }
        }
    }

    fn download_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate, token: &str) -> Result<Url> {
        let mut url = transport::endpoint(&self.base_url, &["v7", "finance", "download", symbol])?;
        url.query_pairs_mut()
            .append_pair("period1", &epoch_seconds(from).to_string())
            .append_pair("period2", &epoch_seconds(to).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history")
            .append_pair("crumb", token);
        Ok(url)
    }
}

/// Interpret the final response of a fetch.
fn content(symbol: &str, response: UpstreamResponse) -> Option<String> {
    let status = response.status;
    if status.is_success() {
        return Some(response.body);
    }

    if status == StatusCode::NOT_FOUND {
        warn!(symbol, "no price data available");
    } else if status == StatusCode::UNAUTHORIZED {
        warn!(symbol, "still unauthorized after session refresh");
    } else {
        warn!(symbol, %status, "unexpected upstream status");
    }
    None
}

/// Seconds since the Unix epoch at UTC midnight of `date`.
fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
