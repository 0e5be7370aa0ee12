use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PricePoint — Single daily (historical) or monthly (projected) price
// ---------------------------------------------------------------------------

/// One trading-day observation, or one synthetic month-end point of a
/// projected scenario.
///
/// Projected points only carry `trade_date` and `close_price`; the other
/// fields are `None` and left out of serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub trade_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_price: Option<Decimal>,
    pub close_price: Decimal,
}

impl PricePoint {
    /// A full OHLC observation as reported by the upstream feed.
    pub fn observed(
        trade_date: NaiveDate,
        open_price: Decimal,
        high_price: Decimal,
        low_price: Decimal,
        close_price: Decimal,
    ) -> Self {
        Self {
            trade_date,
            open_price: Some(open_price),
            high_price: Some(high_price),
            low_price: Some(low_price),
            close_price,
        }
    }

    /// A synthetic point produced by the scenario simulator.
    pub fn projected(trade_date: NaiveDate, close_price: Decimal) -> Self {
        Self {
            trade_date,
            open_price: None,
            high_price: None,
            low_price: None,
            close_price,
        }
    }
}
