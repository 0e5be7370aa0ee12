//! Historical price retrieval and Monte Carlo price projection.
//!
//! Downloads daily OHLC history for a ticker, turns it into a distribution of
//! end-of-month returns, and bootstraps that distribution into projected
//! monthly price paths.
//!
//! # Quick start
//!
//! ```no_run
//! use price_projector::PriceProjector;
//!
//! let projector = PriceProjector::builder().build().unwrap();
//!
//! // Last five years of daily prices
//! let history = projector.historical_series("SPY", None, None).unwrap();
//!
//! // Twenty years of projected month-end closes
//! let projected = projector.projected_series("SPY", None).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod calendar;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod projection;
pub mod returns;
pub mod session;
pub mod simulator;
pub mod transport;

#[cfg(feature = "async")]
pub use async_client::AsyncPriceProjector;
pub use error::{ProjectionError, Result};
pub use fetcher::HistoricalDataFetcher;
pub use models::{PricePoint, ProjectionResult, ReturnDistribution, Scenario};
pub use parser::parse_price_series;
pub use projection::{CancelToken, ProjectionSelector};
pub use returns::build_return_distribution;
pub use session::{SessionProvider, SharedSession, YahooSession};
pub use simulator::simulate;
pub use transport::{HttpTransport, ReqwestTransport, UpstreamResponse};

use chrono::{NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// PriceProjectorBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceProjector`].
///
/// Use [`PriceProjector::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PriceProjectorBuilder::build).
pub struct PriceProjectorBuilder {
    timeout: Duration,
    trials: usize,
    history_years: u32,
    default_horizon: u32,
    base_url: String,
    transport: Option<Arc<dyn HttpTransport>>,
    session: Option<SharedSession>,
    cancel: Option<CancelToken>,
}

impl Default for PriceProjectorBuilder {
    fn default() -> Self {
        Self {
            timeout: config::DEFAULT_TIMEOUT,
            trials: config::DEFAULT_TRIALS,
            history_years: config::DEFAULT_HISTORY_YEARS,
            default_horizon: config::DEFAULT_HORIZON_MONTHS,
            base_url: config::DOWNLOAD_BASE.to_string(),
            transport: None,
            session: None,
            cancel: None,
        }
    }
}

impl PriceProjectorBuilder {
    /// Set the HTTP request timeout for upstream calls.
    ///
    /// Defaults to 30 seconds. Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of simulator trials per projection. Defaults to 1000.
    pub fn trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Years of trailing history used to build the return model.
    ///
    /// Also the default window for [`PriceProjector::historical_series`].
    /// Defaults to 5.
    pub fn history_years(mut self, years: u32) -> Self {
        self.history_years = years;
        self
    }

    /// Horizon used when a projection call does not pass one. Defaults to 240.
    pub fn default_horizon(mut self, months: u32) -> Self {
        self.default_horizon = months;
        self
    }

    /// Host of the historical download endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a custom transport instead of the default `reqwest` client.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom session instead of a [`YahooSession`] over the transport.
    ///
    /// Pass the same [`SharedSession`] to several projectors to share one
    /// token between them.
    pub fn session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Cancel in-flight projections when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the projector. No network request is made until the first call.
    pub fn build(self) -> Result<PriceProjector> {
        if self.trials == 0 {
            return Err(ProjectionError::InvalidArgument(
                "trial count must be at least 1".into(),
            ));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.timeout)?),
        };
        let session = self
            .session
            .unwrap_or_else(|| session::shared(YahooSession::new(transport.clone())));

        let fetcher = HistoricalDataFetcher::new(transport, session).with_base_url(self.base_url);
        let mut selector = ProjectionSelector::new(self.trials);
        if let Some(token) = self.cancel {
            selector = selector.with_cancel_token(token);
        }

        Ok(PriceProjector {
            fetcher,
            selector,
            history_years: self.history_years,
            default_horizon: self.default_horizon,
        })
    }
}

// ---------------------------------------------------------------------------
// PriceProjector
// ---------------------------------------------------------------------------

/// Entry point: historical series and projected series for a symbol.
///
/// Upstream failures never surface as errors here; they yield an empty
/// series. Errors are reserved for invalid arguments and cancellation.
pub struct PriceProjector {
    fetcher: HistoricalDataFetcher,
    selector: ProjectionSelector,
    history_years: u32,
    default_horizon: u32,
}

impl PriceProjector {
    /// Create a new builder for configuring the projector.
    pub fn builder() -> PriceProjectorBuilder {
        PriceProjectorBuilder::default()
    }

    /// Daily price history for `symbol`.
    ///
    /// `from` defaults to `history_years` before today and `to` to today (UTC).
    pub fn historical_series(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>> {
        let today = today();
        let to = to.unwrap_or(today);
        let from = from.unwrap_or_else(|| calendar::years_before(today, self.history_years));
        self.historical_series_between(symbol, from, to)
    }

    /// Daily price history for `symbol` over an explicit window.
    pub fn historical_series_between(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let Some(raw) = self.fetcher.fetch(symbol, from, to)? else {
            warn!(symbol, %from, %to, "no price data, returning an empty series");
            return Ok(Vec::new());
        };
        let series = parse_price_series(&raw);
        info!(symbol, points = series.len(), "parsed price history");
        Ok(series)
    }

    /// The highest-terminal-close scenario out of all trials.
    ///
    /// `horizon_months` defaults to the builder's default horizon (240).
    /// Empty when there is no usable history.
    pub fn projected_series(&self, symbol: &str, horizon_months: Option<u32>) -> Result<Vec<PricePoint>> {
        Ok(self
            .projection(symbol, horizon_months)?
            .map(|result| result.max_scenario.into_points())
            .unwrap_or_default())
    }

    /// Full projection statistics as of today, `None` without usable history.
    pub fn projection(&self, symbol: &str, horizon_months: Option<u32>) -> Result<Option<ProjectionResult>> {
        self.projection_as_of(symbol, today(), horizon_months)
    }

    /// Full projection statistics using the history window ending at `as_of`.
    pub fn projection_as_of(
        &self,
        symbol: &str,
        as_of: NaiveDate,
        horizon_months: Option<u32>,
    ) -> Result<Option<ProjectionResult>> {
        let horizon = horizon_months.unwrap_or(self.default_horizon);
        let from = calendar::years_before(as_of, self.history_years);
        let history = self.historical_series_between(symbol, from, as_of)?;

        // Latest date wins; among duplicates of it, the later row.
        let Some(last) = history.iter().max_by_key(|p| p.trade_date) else {
            return Ok(None);
        };

        let distribution = build_return_distribution(&history);
        let returns = distribution.samples();
        let mut rng = rand::thread_rng();

        match self
            .selector
            .project(last.trade_date, last.close_price, &returns, horizon, &mut rng)
        {
            Ok(result) => {
                info!(
                    symbol,
                    horizon,
                    trials = result.trials,
                    min = ?result.min_scenario.final_close(),
                    median = %result.median_final_close,
                    max = ?result.max_scenario.final_close(),
                    "projected terminal closes"
                );
                Ok(Some(result))
            }
            Err(ProjectionError::NoHistoricalBasis) => {
                warn!(symbol, "return distribution is empty, nothing to project");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Number of simulator trials run per projection.
    pub fn trials(&self) -> usize {
        self.selector.trials()
    }

    /// Years of trailing history fetched for the default window and the
    /// return model.
    pub fn history_years(&self) -> u32 {
        self.history_years
    }
}

impl fmt::Display for PriceProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PriceProjector(trials={}, history_years={}, default_horizon={})",
            self.selector.trials(),
            self.history_years,
            self.default_horizon
        )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
