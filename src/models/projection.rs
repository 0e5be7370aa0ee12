use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::PricePoint;

// ---------------------------------------------------------------------------
// ReturnDistribution — EOM date -> percentage return
// ---------------------------------------------------------------------------

/// End-of-month percentage returns keyed by the month-end trading date.
///
/// Values are percentages rounded to two decimal places (`10.00` means +10%).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnDistribution(BTreeMap<NaiveDate, Decimal>);

impl ReturnDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, eom_date: NaiveDate, percent_return: Decimal) {
        self.0.insert(eom_date, percent_return);
    }

    pub fn get(&self, eom_date: &NaiveDate) -> Option<&Decimal> {
        self.0.get(eom_date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in ascending date order.
    pub fn iter(&self) -> btree_map::Iter<'_, NaiveDate, Decimal> {
        self.0.iter()
    }

    /// The returns as a flat sample pool for bootstrap resampling.
    pub fn samples(&self) -> Vec<Decimal> {
        self.0.values().copied().collect()
    }
}

impl FromIterator<(NaiveDate, Decimal)> for ReturnDistribution {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Scenario — One simulated price path
// ---------------------------------------------------------------------------

/// A simulated sequence of month-end closes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scenario {
    points: Vec<PricePoint>,
}

impl Scenario {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close of the last simulated month, `None` for an empty scenario.
    pub fn final_close(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.close_price)
    }
}

// ---------------------------------------------------------------------------
// ProjectionResult — Aggregate of a multi-trial projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// The trial with the highest terminal close (first one wins on ties).
    pub max_scenario: Scenario,
    /// The trial with the lowest terminal close (first one wins on ties).
    pub min_scenario: Scenario,
    pub median_final_close: Decimal,
    pub trials: usize,
}
