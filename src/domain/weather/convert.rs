//! Conversions from wire types to domain types for weather.

use super::wire::CurrentWeatherResponse;
use super::CityWeather;
use crate::shared::EntityId;

impl CityWeather {
    /// Build from an upstream response. The id comes from the request, since
    /// upstream only echoes the display name.
    pub fn from_response(id: EntityId, resp: CurrentWeatherResponse) -> Self {
        let condition = resp
            .weather
            .into_iter()
            .next()
            .and_then(|c| c.description)
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id,
            name: resp.name,
            temperature: round_half_up(resp.main.temp),
            humidity: resp.main.humidity,
            wind_speed: round_half_up(resp.wind.speed),
            condition,
            is_favorite: false,
        }
    }
}

/// Nearest integer, halves toward +∞ (`-2.5 → -2`, `2.5 → 3`).
fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response_rounds_metrics() {
        let raw = json!({
            "name": "London",
            "main": {"temp": 11.6, "humidity": 81, "pressure": 1012},
            "wind": {"speed": 4.4, "deg": 250},
            "weather": [{"id": 500, "description": "light rain"}]
        });
        let resp: CurrentWeatherResponse = serde_json::from_value(raw).unwrap();
        let city = CityWeather::from_response("london".into(), resp);
        assert_eq!(city.id.as_str(), "london");
        assert_eq!(city.temperature, 12);
        assert_eq!(city.wind_speed, 4);
        assert_eq!(city.humidity, 81);
        assert_eq!(city.condition, "light rain");
        assert!(!city.is_favorite);
    }

    #[test]
    fn test_missing_condition_is_unknown() {
        let raw = json!({
            "name": "Dubai",
            "main": {"temp": 35.2, "humidity": 20},
            "wind": {"speed": 2.5},
            "weather": []
        });
        let resp: CurrentWeatherResponse = serde_json::from_value(raw).unwrap();
        let city = CityWeather::from_response("dubai".into(), resp);
        assert_eq!(city.condition, "Unknown");
        assert_eq!(city.wind_speed, 3);
    }

    #[test]
    fn test_negative_halves_round_up() {
        let raw = json!({
            "name": "Moscow",
            "main": {"temp": -2.5, "humidity": 90},
            "wind": {"speed": 0.5},
            "weather": [{"description": "snow"}]
        });
        let resp: CurrentWeatherResponse = serde_json::from_value(raw).unwrap();
        let city = CityWeather::from_response("moscow".into(), resp);
        assert_eq!(city.temperature, -2);
        assert_eq!(city.wind_speed, 1);

        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.6), -1);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-3.4), -3);
    }
}
