//! # CryptoWeather Nexus core
//!
//! Client core for a dashboard that shows live crypto prices, city weather and
//! crypto headlines, with user favorites that survive every refresh.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Shared types, domain models, the favorite-aware reconciler and
//!    the dashboard store (always available)
//! 2. **HTTP API** — `NexusHttp` with a configurable retry policy
//! 3. **WebSocket** — Live price feed over `tokio-tungstenite` with a fixed-delay
//!    reconnect loop
//! 4. **High-Level Client** — `NexusClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptoweather_nexus::prelude::*;
//!
//! let client = NexusClient::builder().from_env().build()?;
//! let mut store = DashboardStore::default();
//!
//! client.cryptos().refresh(&mut store.crypto).await;
//! client.weather().refresh(&mut store.weather).await;
//! store.crypto.toggle_favorite(&"bitcoin".into());
//!
//! let feed = client.price_feed().open(store.crypto.selected(), |id, price| {
//!     println!("{id}: {price}");
//! })?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Dashboard store and preference persistence.
pub mod store;

/// Unified error types.
pub mod error;

/// Upstream URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// Price feed: frame parsing, connection state, reconnect policy.
pub mod ws;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `NexusClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::EntityId;

    // Domain types
    pub use crate::domain::crypto::{Crypto, CryptoDetail, CryptoState, PricePoint};
    pub use crate::domain::news::{Article, NewsState};
    pub use crate::domain::tracked::{
        FavoriteSet, FetchGuard, FetchOutcome, FetchTicket, TrackedEntity, TrackedState,
    };
    pub use crate::domain::weather::{CityWeather, WeatherState};

    // Store
    pub use crate::store::{DashboardStore, MemoryPreferences, PreferenceStore};

    // WS types
    pub use crate::ws::{ConnectionState, PriceTick, ReconnectPolicy, WsConfig};

    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::{PriceFeed, PriceFeedHandle};

    // Client
    #[cfg(feature = "http")]
    pub use crate::client::{NexusClient, NexusClientBuilder};
    #[cfg(feature = "http")]
    pub use crate::http::RetryPolicy;

    // Errors
    pub use crate::error::{FetchError, HttpError, SdkError, WsError};
}
