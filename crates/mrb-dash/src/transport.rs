use crate::error::DashError;
use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use mrb_core::PingFrame;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

/// Lifecycle of the single duplex connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Reconnect policy: constant interval, unbounded attempts by default.
/// Jitter and an attempt cap are opt-in configuration.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub jitter: Duration,
    pub max_attempts: Option<u64>,
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
            max_attempts: None,
        }
    }

    fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            self.delay
        } else {
            self.delay + self.jitter.mul_f64(rand::random::<f64>())
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(3000))
    }
}

/// One connection attempt. Seam over the websocket library so the retry
/// machine can be driven by scripted connections in tests.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    async fn connect(&self) -> Result<Self::Conn, DashError>;
}

/// An open duplex connection.
#[async_trait]
pub trait Connection: Send {
    async fn send_text(&mut self, text: String) -> Result<(), DashError>;

    /// Next inbound text frame, `None` once the socket has closed.
    async fn next_text(&mut self) -> Option<Result<String, DashError>>;

    async fn close(&mut self);
}

/// Owns the duplex connection lifecycle: connect, ping on open, forward raw
/// frames in arrival order, and schedule exactly one reconnect per close.
///
/// `run` consumes the manager, so a second overlapping connect cycle cannot
/// be started. The shutdown signal cancels a pending reconnect timer, which
/// keeps stale timers from firing after intentional teardown.
pub struct ChannelManager<C: Connector> {
    connector: C,
    policy: ReconnectPolicy,
    frames: mpsc::Sender<String>,
    shutdown: watch::Receiver<bool>,
    state_tx: watch::Sender<ConnectionState>,
}

impl<C: Connector> ChannelManager<C> {
    pub fn new(
        connector: C,
        policy: ReconnectPolicy,
        frames: mpsc::Sender<String>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            connector,
            policy,
            frames,
            shutdown,
            state_tx,
        }
    }

    /// Observe lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub async fn run(mut self) {
        let mut consecutive_closes: u64 = 0;
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            self.state_tx.send_replace(ConnectionState::Connecting);
            match self.connector.connect().await {
                Ok(conn) => {
                    info!("ws_connected");
                    consecutive_closes = 0;
                    self.state_tx.send_replace(ConnectionState::Open);
                    drive_session(conn, &self.frames, &mut self.shutdown).await;
                    info!("ws_disconnected");
                }
                Err(err) => {
                    warn!("ws_connect_error: {err}");
                }
            }
            self.state_tx.send_replace(ConnectionState::Closed);
            if *self.shutdown.borrow() {
                break;
            }
            consecutive_closes += 1;
            if let Some(max) = self.policy.max_attempts {
                if consecutive_closes >= max {
                    warn!("ws_retry_cap_reached: {max}");
                    break;
                }
            }
            let delay = self.policy.next_delay();
            debug!("ws_reconnect_in: {}ms", delay.as_millis());
            if !sleep_unless_shutdown(delay, &mut self.shutdown).await {
                break;
            }
        }
    }
}

/// Sends the liveness ping, then pumps inbound text frames to the dispatcher
/// queue until the socket closes. A transport error forces a close here; the
/// single reconnect per cycle is scheduled by the caller.
async fn drive_session<C: Connection>(
    mut conn: C,
    frames: &mpsc::Sender<String>,
    shutdown: &mut watch::Receiver<bool>,
) {
    let ping = PingFrame::at(Utc::now().timestamp_millis());
    match serde_json::to_string(&ping) {
        Ok(text) => {
            if let Err(err) = conn.send_text(text).await {
                warn!("ws_ping_error: {err}");
                conn.close().await;
                return;
            }
        }
        Err(err) => warn!("ws_ping_encode_error: {err}"),
    }
    loop {
        tokio::select! {
            frame = conn.next_text() => match frame {
                Some(Ok(text)) => {
                    if frames.send(text).await.is_err() {
                        conn.close().await;
                        return;
                    }
                }
                Some(Err(err)) => {
                    warn!("ws_stream_error: {err}");
                    conn.close().await;
                    return;
                }
                None => return,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    conn.close().await;
                    return;
                }
            }
        }
    }
}

/// Waits out the reconnect delay. Returns false when shutdown fires first.
async fn sleep_unless_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

/// Production connector over tokio-tungstenite.
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Conn = WsConnection;

    async fn connect(&self) -> Result<WsConnection, DashError> {
        let (stream, _response) = connect_async(self.url.clone())
            .await
            .map_err(|err| DashError::Transport(err.to_string()))?;
        Ok(WsConnection { stream })
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: String) -> Result<(), DashError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|err| DashError::Transport(err.to_string()))
    }

    async fn next_text(&mut self) -> Option<Result<String, DashError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(err) => return Some(Err(DashError::Transport(err.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
