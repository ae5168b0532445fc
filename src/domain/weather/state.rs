//! Weather state — tracked cities.

use super::{CityWeather, DEFAULT_CITY_IDS};
use crate::domain::tracked::TrackedState;
use crate::shared::ids;

/// Tracked cities, selection and favorites.
///
/// Favorites follow the same favorite-set rule as cryptos, so a city that
/// drops out of one fetch comes back favorited in the next.
pub type WeatherState = TrackedState<CityWeather>;

impl TrackedState<CityWeather> {
    /// State with the default city selection.
    pub fn with_default_cities() -> Self {
        Self::new(ids(DEFAULT_CITY_IDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::EntityId;

    fn city(id: &str) -> CityWeather {
        CityWeather {
            id: EntityId::from(id),
            name: id.to_string(),
            temperature: 20,
            humidity: 50,
            wind_speed: 3,
            condition: "clear sky".into(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_favorite_survives_being_dropped_from_a_fetch() {
        let mut state = WeatherState::with_default_cities();
        let t = state.begin_fetch();
        state.complete_fetch(t, Ok(vec![city("new-york"), city("mumbai")]));
        state.toggle_favorite(&"mumbai".into());

        // mumbai's lookup fails this round and is dropped...
        let t = state.begin_fetch();
        state.complete_fetch(t, Ok(vec![city("new-york")]));
        assert!(state.get(&"mumbai".into()).is_none());

        // ...and comes back favorited on the next one.
        let t = state.begin_fetch();
        state.complete_fetch(t, Ok(vec![city("new-york"), city("mumbai")]));
        assert!(state.get(&"mumbai".into()).unwrap().is_favorite);
    }
}
