//! Shared test fixtures for the price-projector integration tests.
//!
//! Provides a scripted [`HttpTransport`] that replays canned responses and
//! records request URLs, and a counting [`SessionProvider`] that hands out
//! numbered tokens.

#![allow(dead_code)]

use chrono::NaiveDate;
use price_projector::{
    HttpTransport, ProjectionError, Result, SessionProvider, UpstreamResponse,
};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Header plus `rows`, newline-terminated like the upstream feed.
pub fn csv_body(rows: &[&str]) -> String {
    let mut body = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body
}

pub const SAMPLE_ROWS: [&str; 3] = [
    "2017-01-03,225.04,225.83,223.88,225.24,205.06,91366500",
    "2017-01-04,225.62,226.75,225.61,226.58,206.28,78744400",
    "2017-01-05,226.27,226.58,225.48,226.40,206.12,78379000",
];

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Replays queued responses in order and records every requested URL.
///
/// Running out of responses is reported as a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<UpstreamResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, status: StatusCode, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(UpstreamResponse::new(status, body)));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ProjectionError::Transport(message.to_string())));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<UpstreamResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProjectionError::Transport("no scripted response".into())))
    }
}

// ---------------------------------------------------------------------------
// CountingSession
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SessionCounters {
    pub acquisitions: AtomicUsize,
    pub invalidations: AtomicUsize,
}

impl SessionCounters {
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

/// Issues `crumb-1`, `crumb-2`, ... each time a token has to be acquired.
pub struct CountingSession {
    token: Option<String>,
    pub counters: Arc<SessionCounters>,
}

impl CountingSession {
    pub fn new() -> (Self, Arc<SessionCounters>) {
        let counters = Arc::new(SessionCounters::default());
        (
            Self {
                token: None,
                counters: counters.clone(),
            },
            counters,
        )
    }
}

impl SessionProvider for CountingSession {
    fn acquire(&mut self, _symbol: &str) -> Result<()> {
        if self.token.is_none() {
            let n = self.counters.acquisitions.fetch_add(1, Ordering::SeqCst) + 1;
            self.token = Some(format!("crumb-{n}"));
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.counters.invalidations.fetch_add(1, Ordering::SeqCst);
        self.token = None;
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
