//! Conversions from wire types to domain types for cryptos.

use super::wire::{CoinMarket, CoinMarketDetail, MarketChart};
use super::{Crypto, CryptoDetail, PricePoint};

impl From<CoinMarket> for Crypto {
    fn from(c: CoinMarket) -> Self {
        Self {
            id: c.id,
            name: c.name,
            symbol: c.symbol.to_uppercase(),
            price: c.current_price.unwrap_or_default(),
            price_change_24h: c.price_change_percentage_24h.unwrap_or_default(),
            market_cap: c.market_cap.unwrap_or_default(),
            is_favorite: false,
        }
    }
}

impl From<CoinMarketDetail> for CryptoDetail {
    fn from(d: CoinMarketDetail) -> Self {
        let base = Crypto::from(d.market);
        Self {
            id: base.id,
            name: base.name,
            symbol: base.symbol,
            price: base.price,
            initial_price: base.price,
            price_change: base.price_change_24h,
            market_cap: base.market_cap,
            rank: d.market_cap_rank,
            circulating_supply: d.circulating_supply.unwrap_or_default().round(),
            max_supply: d.max_supply,
            ath: d.ath,
            ath_date: d.ath_date,
        }
    }
}

impl From<MarketChart> for Vec<PricePoint> {
    fn from(chart: MarketChart) -> Self {
        chart
            .prices
            .into_iter()
            .map(|(time, price)| PricePoint {
                time: time as i64,
                price,
            })
            .collect()
    }
}
