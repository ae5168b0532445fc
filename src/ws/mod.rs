//! WebSocket layer — price-feed frames, connection state, reconnect policy.
//!
//! The transport lives in `native.rs` (`ws-native` feature, `tokio-tungstenite`).
//! This module defines the shared types and the frame parser, which need no
//! runtime.

#[cfg(feature = "ws-native")]
pub mod native;

use crate::error::WsError;
use crate::shared::serde_util::parse_number;
use crate::shared::{join_ids, EntityId};
use std::time::Duration;

// ─── Ticks ───────────────────────────────────────────────────────────────────

/// A single `(asset, price)` update from the live feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTick {
    pub asset_id: EntityId,
    pub price: f64,
}

/// Parse one inbound frame: a flat JSON object `{"bitcoin": "50000.1", ...}`.
///
/// Ticks come out in the frame's key order. A frame that is not a JSON
/// object is an error; a single non-numeric price is skipped.
pub fn parse_price_frame(text: &str) -> Result<Vec<PriceTick>, WsError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| WsError::DeserializationError(e.to_string()))?;

    let serde_json::Value::Object(map) = value else {
        return Err(WsError::DeserializationError(format!(
            "expected an object of prices, got: {}",
            text
        )));
    };

    let mut ticks = Vec::with_capacity(map.len());
    for (asset, raw) in map {
        match parse_number(&raw) {
            Some(price) => ticks.push(PriceTick {
                asset_id: EntityId::from(asset),
                price,
            }),
            None => tracing::warn!(%asset, %raw, "skipping non-numeric price"),
        }
    }
    Ok(ticks)
}

/// Feed endpoint for a set of assets: `{base}?assets=a,b` (order kept).
pub fn feed_url(base: &str, asset_ids: &[EntityId]) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}assets={}", base, sep, join_ids(asset_ids))
}

// ─── Connection state ────────────────────────────────────────────────────────

/// Lifecycle of a price-feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0,
    Open = 1,
    ClosedPendingReconnect = 2,
    /// Terminal — reached through `close()` or an exhausted retry cap.
    ClosedFinal = 3,
}

impl From<u8> for ConnectionState {
    fn from(v: u8) -> Self {
        match v {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::ClosedPendingReconnect,
            _ => ConnectionState::ClosedFinal,
        }
    }
}

// ─── Reconnect policy ────────────────────────────────────────────────────────

/// Exponential growth applied on top of the base reconnect delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub factor: f64,
    pub max_delay_ms: u64,
    /// Uniform random jitter added to each delay, `0..jitter_ms`.
    pub jitter_ms: u64,
}

/// How the feed reconnects after losing its socket.
///
/// The default is a fixed 5 s delay, retried forever.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub delay_ms: u64,
    /// `None` retries forever. When the cap is hit the feed goes `ClosedFinal`.
    pub max_attempts: Option<u32>,
    /// `None` keeps the delay fixed.
    pub backoff: Option<Backoff>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(5_000)
    }
}

impl ReconnectPolicy {
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            max_attempts: None,
            backoff: None,
        }
    }

    /// Doubling delay from `base_ms`, capped at `max_delay_ms`, with up to
    /// 500 ms of jitter.
    pub fn exponential(base_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            delay_ms: base_ms,
            max_attempts: None,
            backoff: Some(Backoff {
                factor: 2.0,
                max_delay_ms,
                jitter_ms: 500,
            }),
        }
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Whether reconnect attempt number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Delay before reconnect attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let Some(backoff) = &self.backoff else {
            return Duration::from_millis(self.delay_ms);
        };

        let exp = attempt.saturating_sub(1).min(16) as i32;
        let grown = (self.delay_ms as f64 * backoff.factor.powi(exp)) as u64;
        let jitter = if backoff.jitter_ms > 0 {
            rand::random::<u64>() % backoff.jitter_ms
        } else {
            0
        };
        Duration::from_millis(grown.saturating_add(jitter).min(backoff.max_delay_ms))
    }
}

/// Configuration for the price-feed client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Feed base URL; assets are appended as a query string.
    pub url: String,
    pub reconnect: ReconnectPolicy,
    pub connect_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_PRICE_FEED_URL.to_string(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout_ms: 30_000,
        }
    }
}
