//! Live tests for the price feed.
//!
//! All tests are `#[ignore]` because they require network access.
//!
//! Run with:
//! ```bash
//! cargo test --features native --test price_feed_live -- --ignored
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use cryptoweather_nexus::shared::ids;
use cryptoweather_nexus::ws::native::PriceFeed;
use cryptoweather_nexus::ws::{ConnectionState, WsConfig};

const TEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::test]
#[ignore]
async fn test_live_feed_delivers_ticks() {
    let feed = PriceFeed::new(WsConfig::default());
    let (handle, mut ticks) = feed
        .stream(&ids(["bitcoin", "ethereum"]))
        .expect("open should succeed");
    assert_eq!(
        handle.url(),
        "wss://ws.coincap.io/prices?assets=bitcoin,ethereum"
    );

    let tick = timeout(TEST_TIMEOUT, ticks.next())
        .await
        .expect("timed out waiting for a tick")
        .expect("tick stream ended");

    assert!(["bitcoin", "ethereum"].contains(&tick.asset_id.as_str()));
    assert!(tick.price > 0.0);
    assert_eq!(handle.state(), ConnectionState::Open);

    handle.shutdown().await;
}

#[tokio::test]
#[ignore]
async fn test_live_close_stops_feed() {
    let feed = PriceFeed::new(WsConfig::default());
    let (handle, mut ticks) = feed.stream(&ids(["bitcoin"])).expect("open should succeed");

    let _ = timeout(TEST_TIMEOUT, ticks.next()).await;
    handle.close();
    assert_eq!(handle.state(), ConnectionState::ClosedFinal);

    let after = timeout(TEST_TIMEOUT, ticks.next())
        .await
        .expect("stream should end after close");
    assert!(after.is_none());
}
