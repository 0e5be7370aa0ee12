//! CSV price history parsing.
//!
//! The upstream body is `Date,Open,High,Low,Close,...` with a header line.
//! Rows that cannot be read are dropped with a warning; parsing never fails.

use crate::models::PricePoint;
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Parse a raw CSV document into price points, preserving row order.
///
/// The first line is always treated as the header and discarded, whatever it
/// contains. Duplicate dates are kept as separate points.
pub fn parse_price_series(raw: &str) -> Vec<PricePoint> {
    let rows = match raw.split_once('\n') {
        Some((_header, rest)) => rest,
        None => return Vec::new(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rows.as_bytes());

    let mut series = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                if let Some(point) = parse_record(&record) {
                    series.push(point);
                }
            }
            Err(e) => warn!(error = %e, "skipping unreadable price row"),
        }
    }
    series
}

fn parse_record(record: &StringRecord) -> Option<PricePoint> {
    let line = || record.iter().collect::<Vec<_>>().join(",");

    if record.len() < 5 {
        warn!(line = %line(), "skipping price row with too few fields");
        return None;
    }

    let Ok(trade_date) = NaiveDate::parse_from_str(&record[0], "%Y-%m-%d") else {
        warn!(line = %line(), "skipping price row with invalid date");
        return None;
    };

    let prices = (1..5)
        .map(|i| parse_decimal(&record[i]))
        .collect::<Option<Vec<_>>>();
    let Some(&[open, high, low, close]) = prices.as_deref() else {
        warn!(line = %line(), "skipping price row with invalid price");
        return None;
    };

    Some(PricePoint::observed(trade_date, open, high, low, close))
}

fn parse_decimal(field: &str) -> Option<Decimal> {
    Decimal::from_str(field)
        .or_else(|_| Decimal::from_scientific(field))
        .ok()
}
