//! Crypto domain — market snapshots for tracked coins.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod detail;
pub mod state;
pub mod wire;

use crate::domain::tracked::TrackedEntity;
use crate::shared::EntityId;
use serde::{Deserialize, Serialize};

pub use detail::{CryptoDetail, PricePoint};
pub use state::CryptoState;

/// Coins tracked when the user has not chosen any.
pub const DEFAULT_CRYPTO_IDS: [&str; 3] = ["bitcoin", "ethereum", "solana"];

/// A coin's market snapshot, in USD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Crypto {
    pub id: EntityId,
    pub name: String,
    /// Ticker symbol, upper-cased (`"BTC"`).
    pub symbol: String,
    pub price: f64,
    /// 24h change in percent. Zero when upstream has no figure.
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub is_favorite: bool,
}

impl TrackedEntity for Crypto {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
    }
}
