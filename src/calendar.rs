//! Month arithmetic on calendar dates.

use chrono::{Datelike, Months, NaiveDate};

/// Last calendar day of `date`'s month.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// First day of the month after `date`'s month, `None` past the chrono range.
pub fn first_day_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    last_day_of_month(date).succ_opt()
}

/// `date` shifted back by whole years, clamped to the month end (Feb 29 -> Feb 28).
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}
