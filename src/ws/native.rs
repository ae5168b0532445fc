//! Native price-feed client — `tokio-tungstenite`.
//!
//! One background tokio task per open feed:
//! - connects to `{url}?assets=a,b`
//! - parses every text frame into ticks and hands them to the caller's callback
//! - on any close, error or stream end, waits per `ReconnectPolicy` and reconnects
//! - stops for good on `close()` (or when the handle is dropped)
//!
//! The socket sits behind the [`Connector`] / [`FrameSource`] traits so the
//! state machine can be driven by a scripted transport in tests.

use std::cell::Cell;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::shared::EntityId;
use crate::ws::{feed_url, parse_price_frame, ConnectionState, PriceTick, ReconnectPolicy, WsConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type TickCallback = Box<dyn FnMut(&EntityId, f64) + Send + 'static>;

/// Ticks buffered for a [`PriceFeed::stream`] consumer before new ones are dropped.
pub const STREAM_BUFFER: usize = 1024;

thread_local! {
    /// The feed whose callback is running on this thread, if any.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

// ─── Transport seam ──────────────────────────────────────────────────────────

/// A frame as seen by the feed task.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Closed { code: Option<u16>, reason: String },
}

/// Opens sockets.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn FrameSource>, WsError>;
}

/// An open socket.
///
/// `next_frame` must be cancel-safe: it is raced against shutdown.
#[async_trait]
pub trait FrameSource: Send {
    /// `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Result<Frame, WsError>>;

    /// Best-effort graceful close.
    async fn close(&mut self);
}

/// Production connector over `tokio-tungstenite`.
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl TungsteniteConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn FrameSource>, WsError> {
        let (ws_stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| WsError::ConnectionFailed("Connection timeout".into()))?
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (sink, stream) = ws_stream.split();
        Ok(Box::new(TungsteniteSource { sink, stream }))
    }
}

struct TungsteniteSource {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for TungsteniteSource {
    async fn next_frame(&mut self) -> Option<Result<Frame, WsError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    let text_str: &str = text.as_ref();
                    return Some(Ok(Frame::Text(text_str.to_owned())));
                }
                Ok(Message::Ping(data)) => {
                    let _ = self.sink.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(frame)) => {
                    let (code, reason) = extract_close(frame.as_ref());
                    return Some(Ok(Frame::Closed {
                        code: Some(code),
                        reason,
                    }));
                }
                Ok(_) => {} // Binary, Pong, raw Frame — ignore
                Err(e) => return Some(Err(WsError::ProtocolError(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self
            .sink
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "Client disconnect".into(),
            })))
            .await;
        let _ = self.sink.close().await;
    }
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Factory for live price feeds.
#[derive(Clone)]
pub struct PriceFeed {
    config: WsConfig,
    connector: Arc<dyn Connector>,
}

impl PriceFeed {
    pub fn new(config: WsConfig) -> Self {
        let connector = TungsteniteConnector::new(Duration::from_millis(config.connect_timeout_ms));
        Self::with_connector(config, Arc::new(connector))
    }

    pub fn with_connector(config: WsConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Open a feed for `asset_ids` and call `on_tick` for every price.
    ///
    /// Must be called inside a tokio runtime. `on_tick` runs on the feed task;
    /// it may close or drop the returned handle, after which it is not called
    /// again.
    pub fn open<F>(&self, asset_ids: &[EntityId], on_tick: F) -> Result<PriceFeedHandle, WsError>
    where
        F: FnMut(&EntityId, f64) + Send + 'static,
    {
        if asset_ids.is_empty() {
            return Err(WsError::NoAssets);
        }

        let url = feed_url(&self.config.url, asset_ids);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            attempts: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            on_tick: Mutex::new(Some(Box::new(on_tick))),
            reconnect_now: Notify::new(),
        });

        let task = FeedTask {
            url: url.clone(),
            policy: self.config.reconnect.clone(),
            connector: Arc::clone(&self.connector),
            shared: Arc::clone(&shared),
            shutdown_rx,
        };

        tracing::info!("Opening price feed {}", url);
        let handle = tokio::spawn(run_task(task));

        Ok(PriceFeedHandle {
            url,
            shared,
            shutdown_tx,
            task_handle: Some(handle),
        })
    }

    /// Like [`open`](Self::open), but delivers ticks as a stream.
    ///
    /// Up to [`STREAM_BUFFER`] ticks are buffered. While the buffer is full,
    /// new ticks are dropped rather than stalling the feed. The stream ends
    /// once the handle is closed.
    pub fn stream(
        &self,
        asset_ids: &[EntityId],
    ) -> Result<(PriceFeedHandle, Pin<Box<dyn Stream<Item = PriceTick> + Send>>), WsError> {
        self.stream_with_capacity(asset_ids, STREAM_BUFFER)
    }

    fn stream_with_capacity(
        &self,
        asset_ids: &[EntityId],
        capacity: usize,
    ) -> Result<(PriceFeedHandle, Pin<Box<dyn Stream<Item = PriceTick> + Send>>), WsError> {
        let (tx, mut rx) = mpsc::channel::<PriceTick>(capacity.max(1));
        let handle = self.open(asset_ids, move |asset_id, price| {
            let tick = PriceTick {
                asset_id: asset_id.clone(),
                price,
            };
            if let Err(mpsc::error::TrySendError::Full(tick)) = tx.try_send(tick) {
                tracing::debug!("Tick buffer full, dropping {} @ {}", tick.asset_id, tick.price);
            }
        })?;

        let ticks = async_stream::stream! {
            while let Some(tick) = rx.recv().await {
                yield tick;
            }
        };
        Ok((handle, Box::pin(ticks)))
    }
}

/// Owner of one open feed. Dropping it closes the feed.
pub struct PriceFeedHandle {
    url: String,
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    task_handle: Option<JoinHandle<()>>,
}

impl PriceFeedHandle {
    /// Endpoint this feed connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.shared.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Consecutive reconnect attempts since the socket was last open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    /// Skip the remaining reconnect delay, if one is pending.
    pub fn reconnect_now(&self) {
        if self.state() == ConnectionState::ClosedPendingReconnect {
            tracing::info!("Manual reconnection requested");
            self.shared.reconnect_now.notify_one();
        }
    }

    /// Stop the feed. Idempotent.
    ///
    /// Once this returns, `on_tick` is never called again. Any pending
    /// reconnect is cancelled and the socket is closed in the background.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared
            .state
            .store(ConnectionState::ClosedFinal as u8, Ordering::SeqCst);

        // Waits out a callback already in progress.
        self.shared.take_callback();
        self.shutdown_tx.send_replace(true);
        tracing::info!("Price feed closed");
    }

    /// Close and wait (bounded) for the background task to finish.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }
}

impl Drop for PriceFeedHandle {
    fn drop(&mut self) {
        self.close();
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

/// State shared between the handle and the task.
struct Shared {
    state: AtomicU8,
    attempts: AtomicU32,
    closed: AtomicBool,
    on_tick: Mutex<Option<TickCallback>>,
    reconnect_now: Notify,
}

impl Shared {
    /// Move to `next` unless the feed is already `ClosedFinal`.
    fn transition(&self, next: ConnectionState) {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                (cur != ConnectionState::ClosedFinal as u8).then_some(next as u8)
            });
    }

    fn key(&self) -> usize {
        self as *const Shared as usize
    }

    fn take_callback(&self) {
        // Called from inside our own callback: the lock is already held on
        // this thread, and `deliver` drops the callback once it returns.
        if DELIVERING.with(|d| d.get()) == self.key() {
            return;
        }
        let mut guard = self.on_tick.lock().unwrap_or_else(|e| e.into_inner());
        guard.take();
    }

    fn deliver(&self, tick: &PriceTick) {
        let mut guard = self.on_tick.lock().unwrap_or_else(|e| e.into_inner());
        if !self.closed.load(Ordering::SeqCst) {
            if let Some(on_tick) = guard.as_mut() {
                let _delivering = DeliveringGuard::enter(self.key());
                on_tick(&tick.asset_id, tick.price);
            }
        }
        if self.closed.load(Ordering::SeqCst) {
            guard.take();
        }
    }
}

/// Marks this thread as running a feed's callback until dropped.
struct DeliveringGuard {
    prev: usize,
}

impl DeliveringGuard {
    fn enter(key: usize) -> Self {
        Self {
            prev: DELIVERING.with(|d| d.replace(key)),
        }
    }
}

impl Drop for DeliveringGuard {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.prev));
    }
}

struct FeedTask {
    url: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    shared: Arc<Shared>,
    shutdown_rx: watch::Receiver<bool>,
}

enum Exit {
    Shutdown,
    Lost(String),
}

async fn run_task(mut task: FeedTask) {
    loop {
        // ── 1. Connect ───────────────────────────────────────────────────
        task.shared.transition(ConnectionState::Connecting);
        let connector = Arc::clone(&task.connector);
        let connected = tokio::select! {
            biased;
            _ = wait_shutdown(&mut task.shutdown_rx) => break,
            res = connector.connect(&task.url) => res,
        };

        // ── 2. Stream until the socket goes away ─────────────────────────
        match connected {
            Ok(mut source) => {
                task.shared.attempts.store(0, Ordering::SeqCst);
                task.shared.transition(ConnectionState::Open);
                tracing::info!("Price feed connected");

                match run_connected(&mut task, source.as_mut()).await {
                    Exit::Shutdown => {
                        source.close().await;
                        break;
                    }
                    Exit::Lost(reason) => {
                        tracing::warn!("Price feed connection lost: {}", reason);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Price feed connection failed: {}", e);
            }
        }

        // ── 3. Wait, then reconnect ──────────────────────────────────────
        let attempt = task.shared.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if !task.policy.allows(attempt) {
            tracing::warn!("Price feed giving up after {} reconnect attempts", attempt - 1);
            break;
        }

        task.shared.transition(ConnectionState::ClosedPendingReconnect);
        let delay = task.policy.delay_for_attempt(attempt);
        tracing::info!(
            "Reconnect attempt {}{} in {}ms",
            attempt,
            task.policy
                .max_attempts
                .map(|m| format!("/{}", m))
                .unwrap_or_default(),
            delay.as_millis()
        );

        tokio::select! {
            biased;
            _ = wait_shutdown(&mut task.shutdown_rx) => break,
            _ = task.shared.reconnect_now.notified() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }

    task.shared
        .state
        .store(ConnectionState::ClosedFinal as u8, Ordering::SeqCst);
}

/// The connected loop — runs until the socket breaks or the feed is closed.
async fn run_connected(task: &mut FeedTask, source: &mut dyn FrameSource) -> Exit {
    loop {
        tokio::select! {
            biased;
            _ = wait_shutdown(&mut task.shutdown_rx) => return Exit::Shutdown,
            frame = source.next_frame() => match frame {
                Some(Ok(Frame::Text(text))) => match parse_price_frame(&text) {
                    Ok(ticks) => {
                        for tick in &ticks {
                            task.shared.deliver(tick);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Dropping malformed price frame: {} (raw: {})", e, text);
                    }
                },
                Some(Ok(Frame::Closed { code, reason })) => {
                    return Exit::Lost(WsError::Closed { code, reason }.to_string());
                }
                Some(Err(e)) => return Exit::Lost(e.to_string()),
                None => return Exit::Lost("Stream ended".into()),
            }
        }
    }
}

/// Resolves once the feed is closed or the handle is gone.
async fn wait_shutdown(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|closed| *closed).await;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
