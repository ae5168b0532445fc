//! Crypto state — tracked coins plus live price updates from the feed.

use super::{Crypto, DEFAULT_CRYPTO_IDS};
use crate::domain::tracked::TrackedState;
use crate::shared::{ids, EntityId};

/// Tracked coins, selection and favorites.
pub type CryptoState = TrackedState<Crypto>;

impl TrackedState<Crypto> {
    /// State with the default coin selection.
    pub fn with_default_selection() -> Self {
        Self::new(ids(DEFAULT_CRYPTO_IDS))
    }

    /// Apply a live price. Unknown ids are ignored; returns whether a coin
    /// was updated.
    pub fn update_price(&mut self, id: &EntityId, price: f64) -> bool {
        self.update_entity(id, |crypto| crypto.price = price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(price: f64) -> Crypto {
        Crypto {
            id: EntityId::from("ethereum"),
            name: "Ethereum".into(),
            symbol: "ETH".into(),
            price,
            price_change_24h: 1.5,
            market_cap: 500_000.0,
            is_favorite: false,
        }
    }

    #[test]
    fn test_default_selection() {
        let state = CryptoState::with_default_selection();
        assert_eq!(state.selected(), ids(["bitcoin", "ethereum", "solana"]).as_slice());
        assert!(state.favorites().is_empty());
        assert!(state.entities().is_empty());
    }

    #[test]
    fn test_update_price() {
        let mut state = CryptoState::with_default_selection();
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(vec![eth(3000.0)]));

        assert!(state.update_price(&"ethereum".into(), 3500.0));
        assert_eq!(state.get(&"ethereum".into()).unwrap().price, 3500.0);
        assert!(!state.update_price(&"dogecoin".into(), 1.0));
    }

    #[test]
    fn test_update_price_keeps_favorite() {
        let mut state = CryptoState::with_default_selection();
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(vec![eth(3000.0)]));
        state.toggle_favorite(&"ethereum".into());

        state.update_price(&"ethereum".into(), 3100.0);
        assert!(state.get(&"ethereum".into()).unwrap().is_favorite);
    }
}
