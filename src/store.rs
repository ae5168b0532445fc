//! Dashboard store — the three domain states plus persisted preferences.
//!
//! The store is a plain value owned by the application. Wrap it in whatever
//! the app shares state with (`Arc<Mutex<_>>` in the `nexus` binary).

use std::collections::HashMap;

use crate::domain::crypto::CryptoState;
use crate::domain::news::NewsState;
use crate::domain::weather::WeatherState;
use crate::shared::EntityId;
use crate::ws::PriceTick;

pub const CRYPTO_SELECTED_KEY: &str = "crypto.selected";
pub const CRYPTO_FAVORITES_KEY: &str = "crypto.favorites";
pub const WEATHER_SELECTED_KEY: &str = "weather.selected";
pub const WEATHER_FAVORITES_KEY: &str = "weather.favorites";

/// Key/value storage for the user's selections and favorites.
///
/// `load` returns `None` for a key that was never saved.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Option<Vec<String>>;
    fn save(&mut self, key: &str, values: &[String]);
}

/// In-process preference store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    entries: HashMap<String, Vec<String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Option<Vec<String>> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, values: &[String]) {
        self.entries.insert(key.to_string(), values.to_vec());
    }
}

/// Everything the dashboard renders.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    pub crypto: CryptoState,
    pub weather: WeatherState,
    pub news: NewsState,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self {
            crypto: CryptoState::with_default_selection(),
            weather: WeatherState::with_default_cities(),
            news: NewsState::new(),
        }
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a live price to the crypto collection. Returns whether a held
    /// coin was updated.
    pub fn apply_tick(&mut self, tick: &PriceTick) -> bool {
        self.crypto.update_price(&tick.asset_id, tick.price)
    }

    /// Restore selections and favorites. Keys never saved keep their defaults.
    pub fn hydrate(&mut self, prefs: &impl PreferenceStore) {
        if let Some(ids) = load_ids(prefs, CRYPTO_SELECTED_KEY) {
            self.crypto.set_selected(ids);
        }
        if let Some(ids) = load_ids(prefs, CRYPTO_FAVORITES_KEY) {
            self.crypto.set_favorites(ids);
        }
        if let Some(ids) = load_ids(prefs, WEATHER_SELECTED_KEY) {
            self.weather.set_selected(ids);
        }
        if let Some(ids) = load_ids(prefs, WEATHER_FAVORITES_KEY) {
            self.weather.set_favorites(ids);
        }
        tracing::debug!(
            crypto_favorites = self.crypto.favorites().len(),
            weather_favorites = self.weather.favorites().len(),
            "hydrated preferences"
        );
    }

    /// Save all four preference lists.
    pub fn persist(&self, prefs: &mut impl PreferenceStore) {
        prefs.save(CRYPTO_SELECTED_KEY, &to_strings(self.crypto.selected()));
        prefs.save(CRYPTO_FAVORITES_KEY, &to_strings(&self.crypto.favorites().to_vec()));
        prefs.save(WEATHER_SELECTED_KEY, &to_strings(self.weather.selected()));
        prefs.save(WEATHER_FAVORITES_KEY, &to_strings(&self.weather.favorites().to_vec()));
    }
}

fn load_ids(prefs: &impl PreferenceStore, key: &str) -> Option<Vec<EntityId>> {
    prefs
        .load(key)
        .map(|values| values.into_iter().map(EntityId::from).collect())
}

fn to_strings(ids: &[EntityId]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
