//! Nexus CLI
//!
//! Runs the dashboard core headless: periodic market/weather/news refreshes
//! plus the live price feed, logged through `tracing`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use clap::Parser;
use cryptoweather_nexus::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live crypto prices, city weather and crypto news in the terminal")]
struct Cli {
    /// Coins to track (CoinGecko ids)
    #[arg(long, value_delimiter = ',', default_value = "bitcoin,ethereum,solana")]
    crypto: Vec<String>,

    /// Cities to track (catalog ids, e.g. new-york,london)
    #[arg(long, value_delimiter = ',', default_value = "new-york,san-francisco,mumbai")]
    cities: Vec<String>,

    /// Coins and cities to mark as favorites
    #[arg(long, value_delimiter = ',')]
    favorites: Vec<String>,

    /// Seconds between REST refreshes
    #[arg(long, default_value = "60")]
    refresh_secs: u64,

    /// Skip the live price feed
    #[arg(long)]
    no_feed: bool,

    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    openweather_key: Option<String>,

    /// NewsData API key
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    newsdata_key: Option<String>,
}

type SharedStore = Arc<Mutex<DashboardStore>>;

fn lock(store: &SharedStore) -> MutexGuard<'_, DashboardStore> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cryptoweather_nexus=info,nexus=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("CryptoWeather Nexus v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = NexusClient::builder();
    if let Some(key) = &cli.openweather_key {
        builder = builder.openweather_api_key(key);
    }
    if let Some(key) = &cli.newsdata_key {
        builder = builder.newsdata_api_key(key);
    }
    let client = builder.build()?;

    let mut initial = DashboardStore::default();
    initial.crypto.set_selected(to_ids(&cli.crypto));
    initial.weather.set_selected(to_ids(&cli.cities));
    for id in to_ids(&cli.favorites) {
        if cryptoweather_nexus::domain::weather::city_name(&id).is_some() {
            initial.weather.toggle_favorite(&id);
        } else {
            initial.crypto.toggle_favorite(&id);
        }
    }
    let store: SharedStore = Arc::new(Mutex::new(initial));

    let feed = if cli.no_feed {
        None
    } else {
        let assets = lock(&store).crypto.tracked_ids();
        let feed_store = Arc::clone(&store);
        let handle = client.price_feed().open(&assets, move |id, price| {
            let tick = PriceTick {
                asset_id: id.clone(),
                price,
            };
            if lock(&feed_store).apply_tick(&tick) {
                tracing::debug!("{} → {:.2}", id, price);
            }
        })?;
        Some(handle)
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(cli.refresh_secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => refresh_all(&client, &store).await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Shutting down...");
    if let Some(feed) = feed {
        feed.shutdown().await;
    }
    Ok(())
}

/// One refresh round. The store is never locked across an await.
async fn refresh_all(client: &NexusClient, store: &SharedStore) {
    let (crypto_ids, crypto_ticket, city_ids, weather_ticket, news_ticket) = {
        let mut s = lock(store);
        (
            s.crypto.tracked_ids(),
            s.crypto.begin_fetch(),
            s.weather.tracked_ids(),
            s.weather.begin_fetch(),
            s.news.begin_fetch(),
        )
    };

    let (cryptos, cities, articles) = tokio::join!(
        client.cryptos().fetch(&crypto_ids),
        client.weather().fetch(&city_ids),
        client.news().latest(),
    );

    let mut s = lock(store);
    s.crypto.complete_fetch(crypto_ticket, cryptos);
    s.weather.complete_fetch(weather_ticket, cities);
    s.news.complete_fetch(news_ticket, articles);
    report(&s);
}

fn report(store: &DashboardStore) {
    for c in store.crypto.entities() {
        tracing::info!(
            "{}{:<6} ${:>12.2} {:>+6.2}%",
            if c.is_favorite { "★ " } else { "  " },
            c.symbol,
            c.price,
            c.price_change_24h
        );
    }
    for w in store.weather.entities() {
        tracing::info!(
            "{}{:<14} {:>4}°C {:>3}% {:>3} m/s {}",
            if w.is_favorite { "★ " } else { "  " },
            w.name,
            w.temperature,
            w.humidity,
            w.wind_speed,
            w.condition
        );
    }
    if let Some(top) = store.news.articles().first() {
        tracing::info!("Top story: {}", top.title);
    }
    for err in [store.crypto.error(), store.weather.error(), store.news.error()]
        .into_iter()
        .flatten()
    {
        tracing::warn!("{}", err);
    }
}

fn to_ids(raw: &[String]) -> Vec<EntityId> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(EntityId::from)
        .collect()
}
