//! Cryptos sub-client — batched market snapshots.

use crate::client::NexusClient;
use crate::domain::crypto::{Crypto, CryptoDetail, CryptoState, PricePoint};
use crate::domain::tracked::FetchOutcome;
use crate::error::{FetchError, HttpError, SdkError};
use crate::shared::EntityId;

/// Sub-client for crypto market data.
pub struct Cryptos<'a> {
    pub(crate) client: &'a NexusClient,
}

impl<'a> Cryptos<'a> {
    /// Fetch market snapshots for `ids` in one request.
    ///
    /// Entities come back with `is_favorite = false`; reconcile them through
    /// [`CryptoState`] to apply favorites.
    pub async fn fetch(&self, ids: &[EntityId]) -> Result<Vec<Crypto>, SdkError> {
        if ids.is_empty() {
            return Err(FetchError::NoIds.into());
        }
        let markets = self.client.http.get_coin_markets(ids).await?;
        Ok(markets.into_iter().map(Crypto::from).collect())
    }

    /// Extended metrics for one coin.
    pub async fn detail(&self, id: &EntityId) -> Result<CryptoDetail, SdkError> {
        let rows = self.client.http.get_coin_market_detail(id).await?;
        rows.into_iter()
            .find(|row| row.market.id == *id)
            .map(CryptoDetail::from)
            .ok_or_else(|| HttpError::NotFound(format!("Coin not found: {}", id)).into())
    }

    /// USD price history over the last `days` days, oldest first.
    pub async fn history(&self, id: &EntityId, days: u32) -> Result<Vec<PricePoint>, SdkError> {
        let chart = self.client.http.get_market_chart(id, days).await?;
        Ok(chart.into())
    }

    /// Fetch every tracked coin and apply the result to `state`.
    ///
    /// With nothing tracked, the collection is emptied without a request.
    pub async fn refresh(&self, state: &mut CryptoState) -> FetchOutcome {
        let ids = state.tracked_ids();
        let ticket = state.begin_fetch();
        let result = if ids.is_empty() {
            Ok(Vec::new())
        } else {
            self.fetch(&ids).await
        };
        state.complete_fetch(ticket, result)
    }
}
