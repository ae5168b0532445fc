//! Low-level HTTP client — `NexusHttp`.
//!
//! One method per upstream endpoint. Returns wire types (conversion to domain
//! types happens at the sub-client boundary). Internal to the SDK — the
//! high-level client wraps this.

use crate::domain::crypto::wire::{CoinMarket, CoinMarketDetail, MarketChart};
use crate::domain::news::wire::NewsResponse;
use crate::domain::weather::wire::CurrentWeatherResponse;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::EntityId;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing;

const NEWS_QUERY: &str = "crypto OR cryptocurrency OR bitcoin OR ethereum";

/// Base URLs for the three upstream REST APIs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub coingecko: String,
    pub openweather: String,
    pub newsdata: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coingecko: crate::network::DEFAULT_COINGECKO_URL.to_string(),
            openweather: crate::network::DEFAULT_OPENWEATHER_URL.to_string(),
            newsdata: crate::network::DEFAULT_NEWSDATA_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ApiKeys {
    openweather: Option<String>,
    newsdata: Option<String>,
}

/// Low-level HTTP client for the dashboard's upstream APIs.
pub struct NexusHttp {
    endpoints: Endpoints,
    client: Client,
    /// API keys. NEVER exposed publicly.
    keys: Arc<RwLock<ApiKeys>>,
    retry: RetryPolicy,
}

impl NexusHttp {
    pub fn new(endpoints: Endpoints, retry: RetryPolicy) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            endpoints: Endpoints {
                coingecko: endpoints.coingecko.trim_end_matches('/').to_string(),
                openweather: endpoints.openweather.trim_end_matches('/').to_string(),
                newsdata: endpoints.newsdata.trim_end_matches('/').to_string(),
            },
            client,
            keys: Arc::new(RwLock::new(ApiKeys::default())),
            retry,
        })
    }

    /// Seed the API keys at construction time.
    pub(crate) fn with_api_keys(mut self, openweather: Option<String>, newsdata: Option<String>) -> Self {
        self.keys = Arc::new(RwLock::new(ApiKeys {
            openweather,
            newsdata,
        }));
        self
    }

    pub(crate) async fn set_openweather_key(&self, key: Option<String>) {
        self.keys.write().await.openweather = key;
    }

    pub(crate) async fn set_newsdata_key(&self, key: Option<String>) {
        self.keys.write().await.newsdata = key;
    }

    // ── Crypto ───────────────────────────────────────────────────────────

    /// Batched market lookup for all `ids` in one request.
    pub async fn get_coin_markets(&self, ids: &[EntityId]) -> Result<Vec<CoinMarket>, HttpError> {
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&ids={}",
            self.endpoints.coingecko,
            encoded_ids(ids)
        );
        self.get(&url).await
    }

    /// Markets row for a single coin, with the detail-view columns.
    pub async fn get_coin_market_detail(
        &self,
        id: &EntityId,
    ) -> Result<Vec<CoinMarketDetail>, HttpError> {
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&ids={}",
            self.endpoints.coingecko,
            urlencoding::encode(id.as_str())
        );
        self.get(&url).await
    }

    /// USD price history over the last `days` days.
    pub async fn get_market_chart(&self, id: &EntityId, days: u32) -> Result<MarketChart, HttpError> {
        let url = format!(
            "{}/api/v3/coins/{}/market_chart?vs_currency=usd&days={}",
            self.endpoints.coingecko,
            urlencoding::encode(id.as_str()),
            days
        );
        self.get(&url).await
    }

    // ── Weather ──────────────────────────────────────────────────────────

    /// Current conditions for one city, looked up by name, metric units.
    pub async fn get_current_weather(
        &self,
        city_name: &str,
    ) -> Result<CurrentWeatherResponse, HttpError> {
        let key = self.keys.read().await.openweather.clone().unwrap_or_default();
        let url = format!(
            "{}/data/2.5/weather?q={}&appid={}&units=metric",
            self.endpoints.openweather,
            urlencoding::encode(city_name),
            urlencoding::encode(&key)
        );
        self.get(&url).await
    }

    // ── News ─────────────────────────────────────────────────────────────

    pub async fn get_crypto_news(&self) -> Result<NewsResponse, HttpError> {
        let key = self.keys.read().await.newsdata.clone().unwrap_or_default();
        let url = format!(
            "{}/api/1/news?apikey={}&category=business&q={}&language=en",
            self.endpoints.newsdata,
            urlencoding::encode(&key),
            urlencoding::encode(NEWS_QUERY)
        );
        self.get(&url).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let config = match &self.retry {
            RetryPolicy::None => {
                return self.do_get(url).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                            }
                            true
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_connect() || re.is_timeout() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            redact(url)
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        Err(classify_status(status.as_u16(), body_text, retry_after_ms))
    }
}

impl Clone for NexusHttp {
    fn clone(&self) -> Self {
        Self {
            endpoints: self.endpoints.clone(),
            client: self.client.clone(),
            keys: self.keys.clone(),
            retry: self.retry.clone(),
        }
    }
}

/// Comma-joined ids, each percent-encoded. Commas stay literal.
fn encoded_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| urlencoding::encode(id.as_str()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Map a non-success status to an error.
fn classify_status(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        401 => HttpError::Unauthorized,
        404 => HttpError::NotFound(body),
        408 => HttpError::Timeout,
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}

/// Strip key query parameters before a URL is logged.
fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, _)) if k == "appid" || k == "apikey" => format!("{}=***", k),
            _ => pair.to_string(),
        })
        .collect();
    format!("{}?{}", base, params.join("&"))
}
