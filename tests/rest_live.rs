//! Live tests against the real REST upstreams.
//!
//! All tests are `#[ignore]` because they require network access. Weather
//! and news need `OPENWEATHER_API_KEY` / `NEWSDATA_API_KEY`, read from the
//! environment or a `.env` file.
//!
//! Run with:
//! ```bash
//! cargo test --features native --test rest_live -- --ignored
//! ```

use cryptoweather_nexus::client::NexusClient;
use cryptoweather_nexus::domain::crypto::CryptoState;
use cryptoweather_nexus::domain::tracked::FetchOutcome;
use cryptoweather_nexus::domain::weather::WeatherState;
use cryptoweather_nexus::shared::ids;

fn client() -> NexusClient {
    let _ = dotenvy::dotenv();
    NexusClient::builder()
        .from_env()
        .build()
        .expect("client should build")
}

#[tokio::test]
#[ignore]
async fn test_live_crypto_markets() {
    let client = client();
    let cryptos = client
        .cryptos()
        .fetch(&ids(["bitcoin", "ethereum"]))
        .await
        .expect("CoinGecko lookup should succeed");

    assert_eq!(cryptos.len(), 2);
    assert!(cryptos.iter().any(|c| c.symbol == "BTC"));
    assert!(cryptos.iter().all(|c| c.price > 0.0));
}

#[tokio::test]
#[ignore]
async fn test_live_crypto_refresh_keeps_favorite() {
    let client = client();
    let mut state = CryptoState::with_default_selection();
    state.toggle_favorite(&"solana".into());

    let outcome = client.cryptos().refresh(&mut state).await;

    assert!(matches!(outcome, FetchOutcome::Applied { .. }));
    assert!(state.get(&"solana".into()).expect("solana fetched").is_favorite);
}

#[tokio::test]
#[ignore]
async fn test_live_weather_default_cities() {
    let client = client();
    let mut state = WeatherState::with_default_cities();

    let outcome = client.weather().refresh(&mut state).await;

    assert_eq!(outcome, FetchOutcome::Applied { count: 3 });
    assert!(state.get(&"mumbai".into()).is_some());
}

#[tokio::test]
#[ignore]
async fn test_live_news() {
    let client = client();
    let articles = client.news().latest().await.expect("NewsData lookup should succeed");
    assert!(articles.iter().all(|a| !a.id.is_empty()));
}
