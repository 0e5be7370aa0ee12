//! Historical download: session handling, retry and not-found semantics.

mod common;

use common::{csv_body, date, CountingSession, ScriptedTransport, SAMPLE_ROWS};
use price_projector::session;
use price_projector::{
    parse_price_series, HistoricalDataFetcher, HttpTransport, ProjectionError, Result,
    SessionProvider, UpstreamResponse,
};
use reqwest::StatusCode;
use std::sync::{Arc, Barrier};
use std::thread;

fn fetcher() -> (
    HistoricalDataFetcher,
    std::sync::Arc<ScriptedTransport>,
    std::sync::Arc<common::SessionCounters>,
) {
    let transport = ScriptedTransport::new();
    let (session, counters) = CountingSession::new();
    let fetcher = HistoricalDataFetcher::new(transport.clone(), session::shared(session))
        .with_base_url("http://upstream.test");
    (fetcher, transport, counters)
}

// ---------------------------------------------------------------------------
// Success and request shape
// ---------------------------------------------------------------------------

#[test]
fn ok_response_returns_body() {
    let (fetcher, transport, counters) = fetcher();
    transport.push(StatusCode::OK, csv_body(&SAMPLE_ROWS));

    let body = fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    assert_eq!(body, Some(csv_body(&SAMPLE_ROWS)));
    assert_eq!(counters.acquisitions(), 1);
    assert_eq!(counters.invalidations(), 0);
}

#[test]
fn request_carries_epochs_and_token() {
    let (fetcher, transport, _) = fetcher();
    transport.push(StatusCode::OK, csv_body(&[]));

    fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        "http://upstream.test/v7/finance/download/SPY?period1=1483228800&period2=1485907200\
         &interval=1d&events=history&crumb=crumb-1"
    );
}

#[test]
fn symbol_and_token_are_url_encoded() {
    let (fetcher, transport, _) = fetcher();
    transport.push(StatusCode::OK, csv_body(&[]));

    fetcher.fetch("^GSPC/X", date(2017, 1, 1), date(2017, 1, 1)).unwrap();

    let url = &transport.requests()[0];
    assert!(url.contains("/download/"), "{url}");
    assert!(url.contains("GSPC%2FX?period1="), "{url}");
}

// ---------------------------------------------------------------------------
// Unauthorized retry
// ---------------------------------------------------------------------------

#[test]
fn unauthorized_then_ok_matches_immediate_ok() {
    let (direct, direct_transport, _) = fetcher();
    direct_transport.push(StatusCode::OK, csv_body(&SAMPLE_ROWS));
    let expected = parse_price_series(
        &direct.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap().unwrap(),
    );

    let (fetcher, transport, counters) = fetcher();
    transport.push(StatusCode::UNAUTHORIZED, "Unauthorized");
    transport.push(StatusCode::OK, csv_body(&SAMPLE_ROWS));

    let body = fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap().unwrap();

    assert_eq!(parse_price_series(&body), expected);
    assert_eq!(counters.invalidations(), 1);
    assert_eq!(counters.acquisitions(), 2);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].ends_with("crumb=crumb-1"));
    assert!(requests[1].ends_with("crumb=crumb-2"));
}

#[test]
fn second_unauthorized_is_not_retried() {
    let (fetcher, transport, counters) = fetcher();
    transport.push(StatusCode::UNAUTHORIZED, "Unauthorized");
    transport.push(StatusCode::UNAUTHORIZED, "Unauthorized");
    transport.push(StatusCode::OK, csv_body(&SAMPLE_ROWS));

    let body = fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    assert_eq!(body, None);
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(counters.invalidations(), 1);
}

#[test]
fn unauthorized_then_not_found_is_no_data() {
    let (fetcher, transport, counters) = fetcher();
    transport.push(StatusCode::UNAUTHORIZED, "Unauthorized");
    transport.push(StatusCode::NOT_FOUND, "Not Found");

    let body = fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    assert_eq!(body, None);
    assert_eq!(counters.invalidations(), 1);
}

#[test]
fn unauthorized_then_transport_failure_is_no_data() {
    let (fetcher, transport, _) = fetcher();
    transport.push(StatusCode::UNAUTHORIZED, "Unauthorized");
    transport.push_failure("connection reset");

    assert_eq!(fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap(), None);
}

// ---------------------------------------------------------------------------
// No data
// ---------------------------------------------------------------------------

#[test]
fn not_found_is_no_data_without_retry() {
    let (fetcher, transport, counters) = fetcher();
    transport.push(StatusCode::NOT_FOUND, "Not Found");

    let body = fetcher.fetch("NOPE", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    assert_eq!(body, None);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(counters.invalidations(), 0);
}

#[test]
fn transport_failure_is_no_data() {
    let (fetcher, transport, _) = fetcher();
    transport.push_failure("timed out");

    assert_eq!(fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap(), None);
}

#[test]
fn server_error_is_no_data() {
    let (fetcher, transport, _) = fetcher();
    transport.push(StatusCode::INTERNAL_SERVER_ERROR, "oops");

    assert_eq!(fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Contract violations
// ---------------------------------------------------------------------------

#[test]
fn reversed_range_is_invalid() {
    let (fetcher, transport, _) = fetcher();
    let err = fetcher.fetch("SPY", date(2017, 2, 1), date(2017, 1, 1)).unwrap_err();
    assert!(matches!(err, ProjectionError::InvalidArgument(_)));
    assert!(transport.requests().is_empty());
}

#[test]
fn blank_symbol_is_invalid() {
    let (fetcher, _, _) = fetcher();
    let err = fetcher.fetch("  ", date(2017, 1, 1), date(2017, 1, 1)).unwrap_err();
    assert!(matches!(err, ProjectionError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Shared session
// ---------------------------------------------------------------------------

#[test]
fn fetchers_sharing_a_session_reuse_its_token() {
    let transport = ScriptedTransport::new();
    let (provider, counters) = CountingSession::new();
    let shared = session::shared(provider);
    let first = HistoricalDataFetcher::new(transport.clone(), shared.clone())
        .with_base_url("http://upstream.test");
    let second = HistoricalDataFetcher::new(transport.clone(), shared)
        .with_base_url("http://upstream.test");
    transport.push(StatusCode::OK, csv_body(&[]));
    transport.push(StatusCode::OK, csv_body(&[]));

    first.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap();
    second.fetch("QQQ", date(2017, 1, 1), date(2017, 2, 1)).unwrap();

    assert_eq!(counters.acquisitions(), 1);
    assert!(transport.requests().iter().all(|u| u.ends_with("crumb=crumb-1")));
}

#[test]
fn poisoned_session_lock_is_no_data() {
    let transport = ScriptedTransport::new();
    let (provider, _) = CountingSession::new();
    let shared = session::shared(provider);
    let fetcher = HistoricalDataFetcher::new(transport.clone(), shared.clone())
        .with_base_url("http://upstream.test");

    let poisoner = shared.clone();
    let joined = thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("session holder crashed");
    })
    .join();
    assert!(joined.is_err());
    assert!(shared.is_poisoned());

    assert_eq!(fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1)).unwrap(), None);
    assert!(transport.requests().is_empty());
}

/// Rejects every request made with `crumb-1`, holding each rejected request
/// until both callers have sent one. Any other token gets an empty CSV.
struct StaleTokenTransport {
    rendezvous: Barrier,
}

impl HttpTransport for StaleTokenTransport {
    fn get(&self, url: &str) -> Result<UpstreamResponse> {
        if url.ends_with("crumb=crumb-1") {
            self.rendezvous.wait();
            return Ok(UpstreamResponse::new(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
        Ok(UpstreamResponse::new(StatusCode::OK, csv_body(&SAMPLE_ROWS)))
    }
}

#[test]
fn concurrent_refreshes_of_the_same_stale_token_acquire_once() {
    let transport = Arc::new(StaleTokenTransport {
        rendezvous: Barrier::new(2),
    });
    let (provider, counters) = CountingSession::new();
    let shared = session::shared(provider);
    let fetchers: Vec<_> = (0..2)
        .map(|_| {
            HistoricalDataFetcher::new(transport.clone(), shared.clone())
                .with_base_url("http://upstream.test")
        })
        .collect();

    let bodies: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = fetchers
            .iter()
            .map(|fetcher| scope.spawn(move || fetcher.fetch("SPY", date(2017, 1, 1), date(2017, 2, 1))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    assert!(bodies.iter().all(|body| body.as_deref() == Some(csv_body(&SAMPLE_ROWS).as_str())));
    assert_eq!(counters.invalidations(), 1);
    assert_eq!(counters.acquisitions(), 2);
    assert_eq!(shared.lock().unwrap().token(), Some("crumb-2"));
}
