//! Weather sub-client — per-city lookups, settled together.

use crate::client::NexusClient;
use crate::domain::tracked::{keep_successes, FetchOutcome};
use crate::domain::weather::{city_name, CityWeather, WeatherState};
use crate::error::{FetchError, SdkError};
use crate::shared::EntityId;
use futures_util::future::join_all;

/// Sub-client for current weather.
pub struct Weather<'a> {
    pub(crate) client: &'a NexusClient,
}

impl<'a> Weather<'a> {
    /// Current conditions for one known city.
    pub async fn fetch_one(&self, id: &EntityId) -> Result<CityWeather, SdkError> {
        let name = city_name(id).ok_or_else(|| FetchError::UnknownCity(id.to_string()))?;
        let resp = self.client.http.get_current_weather(name).await?;
        Ok(CityWeather::from_response(id.clone(), resp))
    }

    /// Look up every id concurrently and keep whatever succeeded.
    ///
    /// Ids missing from the city catalog are skipped. Fails only when no id
    /// is known or every lookup failed.
    pub async fn fetch(&self, ids: &[EntityId]) -> Result<Vec<CityWeather>, SdkError> {
        let (known, unknown): (Vec<&EntityId>, Vec<&EntityId>) =
            ids.iter().partition(|id| city_name(id).is_some());
        for id in unknown {
            tracing::debug!(%id, "skipping unknown city id");
        }
        if known.is_empty() {
            return Err(FetchError::NoIds.into());
        }

        let lookups = known.into_iter().map(|id| async move {
            let result = self.fetch_one(id).await;
            (id.clone(), result)
        });
        keep_successes(join_all(lookups).await)
    }

    /// Fetch every tracked city and apply the result to `state`.
    pub async fn refresh(&self, state: &mut WeatherState) -> FetchOutcome {
        let ids = state.tracked_ids();
        let ticket = state.begin_fetch();
        let result = self.fetch(&ids).await;
        state.complete_fetch(ticket, result)
    }
}
