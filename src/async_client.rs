//! Async wrapper around [`PriceProjector`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all projector operations on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP client waits and the simulator crunches trials.
//!
//! # Example
//!
//! ```no_run
//! use price_projector::AsyncPriceProjector;
//!
//! #[tokio::main]
//! async fn main() {
//!     let projector = AsyncPriceProjector::builder().build().await.unwrap();
//!
//!     let projected = projector.projected_series("SPY", Some(120)).await.unwrap();
//!
//!     // Any sync method via closure
//!     let trials = projector.run(|p| Ok(p.trials())).await.unwrap();
//! }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{ProjectionError, Result};
use crate::models::{PricePoint, ProjectionResult};
use crate::{PriceProjector, PriceProjectorBuilder};

// ---------------------------------------------------------------------------
// AsyncPriceProjectorBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncPriceProjector`]; wraps a [`PriceProjectorBuilder`].
#[derive(Default)]
pub struct AsyncPriceProjectorBuilder {
    inner: PriceProjectorBuilder,
}

impl AsyncPriceProjectorBuilder {
    /// Adjust the underlying blocking builder.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(PriceProjectorBuilder) -> PriceProjectorBuilder,
    {
        self.inner = f(self.inner);
        self
    }

    /// Build the async projector.
    ///
    /// Construction creates the HTTP client, so it runs on the blocking pool.
    pub async fn build(self) -> Result<AsyncPriceProjector> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let projector = inner.build()?;
            Ok(AsyncPriceProjector {
                inner: Arc::new(projector),
            })
        })
        .await
        .map_err(|e| ProjectionError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncPriceProjector
// ---------------------------------------------------------------------------

/// Async wrapper around [`PriceProjector`].
///
/// The projector is `Sync` (its session is behind a mutex), so it is shared
/// through an `Arc` without an outer lock and calls may run concurrently.
#[derive(Clone)]
pub struct AsyncPriceProjector {
    inner: Arc<PriceProjector>,
}

impl AsyncPriceProjector {
    /// Create a new builder for configuring the async projector.
    pub fn builder() -> AsyncPriceProjectorBuilder {
        AsyncPriceProjectorBuilder::default()
    }

    /// Wrap an already built projector.
    pub fn from_projector(projector: PriceProjector) -> Self {
        Self {
            inner: Arc::new(projector),
        }
    }

    /// Run a sync projector operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PriceProjector) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let projector = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&projector))
            .await
            .map_err(|e| ProjectionError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// See [`PriceProjector::historical_series`].
    pub async fn historical_series(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>> {
        let symbol = symbol.to_string();
        self.run(move |p| p.historical_series(&symbol, from, to)).await
    }

    /// See [`PriceProjector::projected_series`].
    pub async fn projected_series(
        &self,
        symbol: &str,
        horizon_months: Option<u32>,
    ) -> Result<Vec<PricePoint>> {
        let symbol = symbol.to_string();
        self.run(move |p| p.projected_series(&symbol, horizon_months))
            .await
    }

    /// See [`PriceProjector::projection`].
    pub async fn projection(
        &self,
        symbol: &str,
        horizon_months: Option<u32>,
    ) -> Result<Option<ProjectionResult>> {
        let symbol = symbol.to_string();
        self.run(move |p| p.projection(&symbol, horizon_months)).await
    }
}
