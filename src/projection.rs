//! Multi-trial projection: runs the simulator repeatedly and keeps the
//! extreme scenarios plus the median terminal close.

use crate::config;
use crate::error::{ProjectionError, Result};
use crate::models::{ProjectionResult, Scenario};
use crate::simulator::simulate;
use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, checked between trials.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// ProjectionSelector
// ---------------------------------------------------------------------------

/// Runs a fixed number of independent simulator trials and reduces them.
#[derive(Debug, Clone)]
pub struct ProjectionSelector {
    trials: usize,
    cancel: Option<CancelToken>,
}

impl Default for ProjectionSelector {
    fn default() -> Self {
        Self::new(config::DEFAULT_TRIALS)
    }
}

impl ProjectionSelector {
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            cancel: None,
        }
    }

    /// Abort the projection with [`ProjectionError::Cancelled`] once `token`
    /// is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Run every trial and return the max / min final-close scenarios with the
    /// median final close.
    ///
    /// A later trial only replaces the current max (min) when its final close
    /// is strictly greater (less). An empty scenario, from a horizon too short
    /// to contain a month, counts as ending at `last_close`.
    pub fn project<R: Rng + ?Sized>(
        &self,
        last_date: NaiveDate,
        last_close: Decimal,
        returns: &[Decimal],
        horizon_months: u32,
        rng: &mut R,
    ) -> Result<ProjectionResult> {
        if self.trials == 0 {
            return Err(ProjectionError::InvalidArgument(
                "trial count must be at least 1".into(),
            ));
        }
        if returns.is_empty() {
            return Err(ProjectionError::NoHistoricalBasis);
        }

        let mut max: Option<(Decimal, Scenario)> = None;
        let mut min: Option<(Decimal, Scenario)> = None;
        let mut final_closes = Vec::with_capacity(self.trials);

        for _ in 0..self.trials {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(ProjectionError::Cancelled);
            }

            let scenario = simulate(last_date, last_close, returns, horizon_months, rng)?;
            let final_close = scenario.final_close().unwrap_or(last_close);
            final_closes.push(final_close);

            if max.as_ref().map_or(true, |(best, _)| final_close > *best) {
                max = Some((final_close, scenario.clone()));
            }
            if min.as_ref().map_or(true, |(worst, _)| final_close < *worst) {
                min = Some((final_close, scenario));
            }
        }

        let (Some((_, max_scenario)), Some((_, min_scenario)), Some(median_final_close)) =
            (max, min, median(&mut final_closes))
        else {
            return Err(ProjectionError::NoHistoricalBasis);
        };

        debug!(trials = self.trials, %median_final_close, "projection complete");
        Ok(ProjectionResult {
            max_scenario,
            min_scenario,
            median_final_close,
            trials: self.trials,
        })
    }
}

/// Median of `values`, sorting them in place. The mean of the two middle
/// values for an even count; `None` when empty. Never overflows, even for
/// values near `Decimal::MAX`.
pub fn median(values: &mut [Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let (lo, hi) = (values[mid - 1], values[mid]);
        // lo + hi only overflows when both share a sign, and then hi - lo cannot.
        Some(match lo.checked_add(hi) {
            Some(sum) => sum / Decimal::TWO,
            None => lo + (hi - lo) / Decimal::TWO,
        })
    }
}
