//! Network URL constants for the upstream APIs.

/// Default CoinGecko REST base URL (market lookups).
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com";

/// Default OpenWeather REST base URL.
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";

/// Default NewsData REST base URL.
pub const DEFAULT_NEWSDATA_URL: &str = "https://newsdata.io";

/// Default live price-feed WebSocket URL. Assets are appended as `?assets=a,b`.
pub const DEFAULT_PRICE_FEED_URL: &str = "wss://ws.coincap.io/prices";
