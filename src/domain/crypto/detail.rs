//! Single-coin detail — extended market metrics plus price history.

use crate::shared::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default history window for the detail view, in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// A single point on a price chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds.
    pub time: i64,
    pub price: f64,
}

/// One coin with the metrics the detail view shows.
///
/// `initial_price` is the price at fetch time. Live ticks move `price` and
/// recompute `price_change` against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoDetail {
    pub id: EntityId,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub initial_price: f64,
    /// Percent. Upstream's 24h change until the first live tick.
    pub price_change: f64,
    pub market_cap: f64,
    pub rank: Option<u32>,
    /// Rounded to whole coins.
    pub circulating_supply: f64,
    /// `None` for coins without a supply cap.
    pub max_supply: Option<f64>,
    pub ath: Option<f64>,
    pub ath_date: Option<DateTime<Utc>>,
}

impl CryptoDetail {
    /// Apply a live price. Ticks for other coins are ignored; returns whether
    /// this detail changed.
    pub fn apply_price(&mut self, id: &EntityId, price: f64) -> bool {
        if *id != self.id {
            return false;
        }
        self.price = price;
        if self.initial_price != 0.0 {
            self.price_change = (price - self.initial_price) / self.initial_price * 100.0;
        }
        true
    }
}
