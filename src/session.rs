//! Upstream authentication session (crumb + cookies).
//!
//! The session is process-wide state shared by every fetch. It is held behind
//! a [`SharedSession`] mutex so that an invalidate-then-reacquire sequence
//! from one request cannot interleave with another request's refresh.

use crate::config;
use crate::error::{ProjectionError, Result};
use crate::transport::{self, HttpTransport};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Supplies and refreshes the auth token used by download requests.
pub trait SessionProvider: Send {
    /// Ensure a token exists, acquiring one scoped to `symbol` if needed.
    /// A no-op when a token is already held.
    fn acquire(&mut self, symbol: &str) -> Result<()>;

    /// Discard the current token so the next `acquire` fetches a fresh one.
    fn invalidate(&mut self);

    /// The current token, if one has been acquired.
    fn token(&self) -> Option<&str>;
}

/// Lock-guarded session shared between fetchers.
pub type SharedSession = Arc<Mutex<dyn SessionProvider>>;

/// Wrap a provider for sharing.
pub fn shared<S: SessionProvider + 'static>(provider: S) -> SharedSession {
    Arc::new(Mutex::new(provider))
}

// ---------------------------------------------------------------------------
// YahooSession
// ---------------------------------------------------------------------------

/// Crumb-based session against the Yahoo Finance endpoints.
///
/// Cookies live in the transport's cookie store; this type only tracks the
/// crumb that has to accompany them.
pub struct YahooSession {
    transport: Arc<dyn HttpTransport>,
    crumb: Option<String>,
}

impl YahooSession {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            crumb: None,
        }
    }

    /// Visit the quote page so the provider sets its session cookies.
    fn seed_cookies(&self, symbol: &str) {
        let url = match transport::endpoint(config::QUOTE_BASE, &[symbol]) {
            Ok(url) => url,
            Err(e) => {
                warn!(symbol, error = %e, "cannot build quote page URL");
                return;
            }
        };
        match self.transport.get(url.as_str()) {
            Ok(resp) => debug!(symbol, status = %resp.status, "seeded session cookies"),
            // The crumb request below reports the real failure, if any.
            Err(e) => warn!(symbol, error = %e, "failed to load quote page for cookies"),
        }
    }
}

impl SessionProvider for YahooSession {
    fn acquire(&mut self, symbol: &str) -> Result<()> {
        if self.crumb.is_some() {
            return Ok(());
        }

        self.seed_cookies(symbol);

        let resp = self.transport.get(config::CRUMB_URL)?;
        if !resp.status.is_success() {
            return Err(ProjectionError::Session(format!(
                "crumb endpoint returned {}",
                resp.status
            )));
        }

        let crumb = resp.body.trim();
        if crumb.is_empty() || crumb.contains(char::is_whitespace) {
            return Err(ProjectionError::Session(
                "crumb endpoint returned an unusable crumb".into(),
            ));
        }

        debug!(symbol, "acquired session crumb");
        self.crumb = Some(crumb.to_string());
        Ok(())
    }

    fn invalidate(&mut self) {
        self.crumb = None;
    }

    fn token(&self) -> Option<&str> {
        self.crumb.as_deref()
    }
}
