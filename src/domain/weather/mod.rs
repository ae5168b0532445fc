//! Weather domain — current conditions for tracked cities.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::domain::tracked::TrackedEntity;
use crate::shared::EntityId;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use state::WeatherState;

/// Cities tracked when the user has not chosen any.
pub const DEFAULT_CITY_IDS: [&str; 3] = ["new-york", "san-francisco", "mumbai"];

lazy_static! {
    /// City id → name used for the upstream `q=` lookup.
    static ref CITY_CATALOG: HashMap<&'static str, &'static str> = HashMap::from([
        ("new-york", "New York"),
        ("san-francisco", "San Francisco"),
        ("mumbai", "Mumbai"),
        ("london", "London"),
        ("tokyo", "Tokyo"),
        ("paris", "Paris"),
        ("sydney", "Sydney"),
        ("berlin", "Berlin"),
        ("dubai", "Dubai"),
        ("moscow", "Moscow"),
        ("shanghai", "Shanghai"),
        ("singapore", "Singapore"),
    ]);
}

/// Lookup name for a known city id.
pub fn city_name(id: &EntityId) -> Option<&'static str> {
    CITY_CATALOG.get(id.as_str()).copied()
}

/// All known city ids, sorted.
pub fn known_cities() -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = CITY_CATALOG.keys().map(|k| EntityId::from(*k)).collect();
    ids.sort();
    ids
}

/// Current conditions for one city (metric units).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityWeather {
    pub id: EntityId,
    pub name: String,
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Metres per second, rounded.
    pub wind_speed: i32,
    pub condition: String,
    pub is_favorite: bool,
}

impl TrackedEntity for CityWeather {
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
