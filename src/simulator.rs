//! Bootstrap scenario simulator.
//!
//! Builds one projected monthly price path by drawing historical monthly
//! returns uniformly with replacement and compounding them from the last
//! observed close.

use crate::calendar::{first_day_of_next_month, last_day_of_month};
use crate::error::{ProjectionError, Result};
use crate::models::{PricePoint, Scenario};
use chrono::{Months, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Simulate one month-end price path after `last_date`.
///
/// The path starts with the month following `last_date` and keeps adding
/// months while the next month's first day is strictly before
/// `last_date + horizon_months`. That yields at most `horizon_months` points
/// (one fewer when `last_date` falls on the first of a month) and none for a
/// zero horizon.
///
/// `returns` are percentages (`10.00` is +10%). Closes that would leave the
/// `Decimal` range saturate at `Decimal::MAX` (or `Decimal::MIN`) and keep
/// compounding from there. Pass a seeded generator for reproducible paths.
pub fn simulate<R: Rng + ?Sized>(
    last_date: NaiveDate,
    last_close: Decimal,
    returns: &[Decimal],
    horizon_months: u32,
    rng: &mut R,
) -> Result<Scenario> {
    if returns.is_empty() {
        return Err(ProjectionError::NoHistoricalBasis);
    }

    let horizon_end = last_date
        .checked_add_months(Months::new(horizon_months))
        .ok_or_else(|| {
            ProjectionError::InvalidArgument(format!(
                "horizon of {horizon_months} months from {last_date} is out of range"
            ))
        })?;

    let mut month_start = first_day_of_next_month(last_date).ok_or(ProjectionError::Overflow)?;
    let mut start_price = last_close;
    let mut points = Vec::new();

    while month_start < horizon_end {
        let drawn = *returns.choose(rng).ok_or(ProjectionError::NoHistoricalBasis)?;
        let month_end = last_day_of_month(month_start);
        let close = apply_return(start_price, drawn);

        points.push(PricePoint::projected(month_end, close));

        month_start = month_end.succ_opt().ok_or(ProjectionError::Overflow)?;
        start_price = close;
    }

    Ok(Scenario::new(points))
}

/// `price * (1 + percent / 100)`, saturating at the `Decimal` bounds.
fn apply_return(price: Decimal, percent: Decimal) -> Decimal {
    let growth = Decimal::ONE.saturating_add(percent / Decimal::ONE_HUNDRED);
    price.saturating_mul(growth)
}
