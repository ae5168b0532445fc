//! High-level client — `NexusClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder and the accessor methods.

use crate::domain::crypto::client::Cryptos;
use crate::domain::news::client::News;
use crate::domain::weather::client::Weather;
use crate::error::SdkError;
use crate::http::{Endpoints, NexusHttp, RetryPolicy};
use crate::ws::{ReconnectPolicy, WsConfig};

// Re-export sub-client types for convenience.
pub use crate::domain::crypto::client::Cryptos as CryptosClient;
pub use crate::domain::news::client::News as NewsClient;
pub use crate::domain::weather::client::Weather as WeatherClient;

/// Environment variable holding the OpenWeather API key.
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable holding the NewsData API key.
pub const NEWSDATA_KEY_ENV: &str = "NEWSDATA_API_KEY";

/// The primary entry point for the dashboard core.
///
/// Provides nested sub-client accessors for each domain:
/// `client.cryptos()`, `client.weather()`, `client.news()`.
pub struct NexusClient {
    pub(crate) http: NexusHttp,
    pub(crate) ws_config: WsConfig,
}

impl NexusClient {
    pub fn builder() -> NexusClientBuilder {
        NexusClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn cryptos(&self) -> Cryptos<'_> {
        Cryptos { client: self }
    }

    pub fn weather(&self) -> Weather<'_> {
        Weather { client: self }
    }

    pub fn news(&self) -> News<'_> {
        News { client: self }
    }

    /// Get the config used for live price feeds.
    ///
    /// Feeds are not embedded in `NexusClient` because their lifetime
    /// belongs to the application (e.g. the dashboard view being mounted).
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a price-feed factory from the current config.
    #[cfg(feature = "ws-native")]
    pub fn price_feed(&self) -> crate::ws::native::PriceFeed {
        crate::ws::native::PriceFeed::new(self.ws_config.clone())
    }

    /// Replace the OpenWeather API key for subsequent requests.
    pub async fn set_openweather_key(&self, key: Option<String>) {
        self.http.set_openweather_key(key).await;
    }

    /// Replace the NewsData API key for subsequent requests.
    pub async fn set_newsdata_key(&self, key: Option<String>) {
        self.http.set_newsdata_key(key).await;
    }
}

impl Clone for NexusClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            ws_config: self.ws_config.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct NexusClientBuilder {
    endpoints: Endpoints,
    price_feed_url: String,
    openweather_api_key: Option<String>,
    newsdata_api_key: Option<String>,
    retry_policy: RetryPolicy,
    reconnect_policy: ReconnectPolicy,
}

impl Default for NexusClientBuilder {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            price_feed_url: crate::network::DEFAULT_PRICE_FEED_URL.to_string(),
            openweather_api_key: None,
            newsdata_api_key: None,
            retry_policy: RetryPolicy::default(),
            reconnect_policy: ReconnectPolicy::default(),
        }
    }
}

impl NexusClientBuilder {
    pub fn coingecko_url(mut self, url: &str) -> Self {
        self.endpoints.coingecko = url.to_string();
        self
    }

    pub fn openweather_url(mut self, url: &str) -> Self {
        self.endpoints.openweather = url.to_string();
        self
    }

    pub fn newsdata_url(mut self, url: &str) -> Self {
        self.endpoints.newsdata = url.to_string();
        self
    }

    pub fn price_feed_url(mut self, url: &str) -> Self {
        self.price_feed_url = url.to_string();
        self
    }

    pub fn openweather_api_key(mut self, key: &str) -> Self {
        self.openweather_api_key = Some(key.to_string());
        self
    }

    pub fn newsdata_api_key(mut self, key: &str) -> Self {
        self.newsdata_api_key = Some(key.to_string());
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }

    /// Pick up API keys from the environment. Unset or blank variables leave
    /// the current value alone.
    pub fn from_env(mut self) -> Self {
        if let Some(key) = env_key(OPENWEATHER_KEY_ENV) {
            self.openweather_api_key = Some(key);
        }
        if let Some(key) = env_key(NEWSDATA_KEY_ENV) {
            self.newsdata_api_key = Some(key);
        }
        self
    }

    pub fn build(self) -> Result<NexusClient, SdkError> {
        if self.openweather_api_key.is_none() {
            tracing::debug!("no OpenWeather key configured, weather lookups will be rejected upstream");
        }
        let http = NexusHttp::new(self.endpoints, self.retry_policy)?
            .with_api_keys(self.openweather_api_key, self.newsdata_api_key);

        Ok(NexusClient {
            http,
            ws_config: WsConfig {
                url: self.price_feed_url,
                reconnect: self.reconnect_policy,
                ..WsConfig::default()
            },
        })
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
