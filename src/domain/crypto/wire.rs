//! Wire types for CoinGecko `/coins/markets` (REST).

use crate::shared::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the markets response. Numeric fields are nullable upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinMarket {
    pub id: EntityId,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// Extra columns of the same markets row, used by the coin detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinMarketDetail {
    #[serde(flatten)]
    pub market: CoinMarket,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<DateTime<Utc>>,
}

/// `/coins/{id}/market_chart` response. Each point is `[unix_ms, price]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}
