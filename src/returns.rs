//! End-of-month return model built from a daily close series.

use crate::calendar::last_day_of_month;
use crate::models::{PricePoint, ReturnDistribution};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use tracing::{debug, warn};

/// Build the EOM percentage-return distribution for `series`.
///
/// Points are collapsed by date (the later point wins) and walked in date
/// order. Each period runs from its first available date to the last date
/// with data on or before that month's calendar end; the next period starts
/// at the first date after the calendar end. A period whose start close is
/// zero has no defined return and is skipped.
pub fn build_return_distribution(series: &[PricePoint]) -> ReturnDistribution {
    let closes: BTreeMap<NaiveDate, Decimal> = series
        .iter()
        .map(|p| (p.trade_date, p.close_price))
        .collect();

    let mut distribution = ReturnDistribution::new();
    let mut cursor = closes.iter().next().map(|(d, c)| (*d, *c));

    while let Some((start_date, start_close)) = cursor {
        let month_end = last_day_of_month(start_date);
        // The start date is in range, so this always finds a close.
        let (eom_date, eom_close) = closes
            .range(start_date..=month_end)
            .next_back()
            .map(|(d, c)| (*d, *c))
            .unwrap_or((start_date, start_close));

        match percent_change(start_close, eom_close) {
            Some(change) => distribution.insert(eom_date, change),
            None => warn!(%start_date, %eom_date, "skipping period with zero starting close"),
        }

        cursor = closes
            .range((Excluded(month_end), Unbounded))
            .next()
            .map(|(d, c)| (*d, *c));
    }

    debug!(periods = distribution.len(), "built return distribution");
    distribution
}

/// `(end - start) * 100 / start`, rounded half-up to two decimal places.
pub fn percent_change(start: Decimal, end: Decimal) -> Option<Decimal> {
    if start.is_zero() {
        return None;
    }
    let change = end
        .checked_sub(start)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(start)?;
    Some(change.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
