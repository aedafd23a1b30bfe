//! WebSocket transport
//!
//! Accepts connections and turns protocol frames into broker calls:
//! - every connection gets a [`Client`] endpoint and a writer task that
//!   drains the client's channel onto the socket
//! - JSON frames subscribe, unsubscribe or publish; a plain text frame is
//!   taken as the name of a topic to subscribe to
//! - on close, every subscription the connection held is dropped
//! - idle connections are pinged; one that sends nothing, pongs included,
//!   for `idle_timeout` is closed and pruned
//!
//! The broker only keeps weak references to clients, so a connection that
//! dies without a clean close is also pruned on the next publish to its
//! topics.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::broker::endpoint::{Endpoint, SubscriptionId};
use crate::client::Client;
use crate::config::Settings;
use crate::transport::message::{ClientMessage, ServerMessage};

/// Per-connection knobs for the WebSocket server.
#[derive(Debug, Clone)]
pub struct WebSocketOptions {
    /// Outbound frames buffered per connection.
    pub buffer: usize,
    pub ping_interval: Duration,
    /// Close a connection that has sent nothing for this long.
    pub idle_timeout: Duration,
}

impl Default for WebSocketOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for WebSocketOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            buffer: settings.broker.subscriber_buffer,
            ping_interval: Duration::from_millis(settings.server.ws_ping_interval_ms),
            idle_timeout: Duration::from_millis(settings.server.ws_idle_timeout_ms),
        }
    }
}

pub async fn start_websocket_server(
    addr: &str,
    broker: Arc<Broker>,
    options: WebSocketOptions,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_websocket(listener, broker, options).await
}

/// Runs the accept loop on an already bound listener.
pub async fn serve_websocket(
    listener: TcpListener,
    broker: Arc<Broker>,
    options: WebSocketOptions,
) -> anyhow::Result<()> {
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(handle_connection(stream, peer, broker.clone(), options.clone()));
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    broker: Arc<Broker>,
    options: WebSocketOptions,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, "WebSocket handshake error: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<WsMessage>(options.buffer.max(1));
    let client = Arc::new(Client::new(tx));
    let endpoint: Arc<dyn Endpoint> = client.clone();
    let client_id = client.id.clone();
    info!(client = %client_id, %peer, "client connected");

    let writer = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    debug!(client = %client_id, "failed to write frame: {e}");
                    break;
                }
            }
        })
    };

    let mut session = Session {
        broker: &broker,
        client: &client,
        endpoint: &endpoint,
        subscriptions: HashMap::new(),
    };

    let period = options.ping_interval.max(Duration::from_millis(1));
    let mut keepalive = interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                let Some(frame) = frame else { break };
                last_seen = Instant::now();
                match frame {
                    Ok(WsMessage::Text(text)) => session.handle_text(text.as_str()).await,
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(client = %client_id, "read error: {e}");
                        break;
                    }
                }
            }
            _ = keepalive.tick() => {
                if last_seen.elapsed() >= options.idle_timeout {
                    info!(client = %client_id, "closing idle connection");
                    break;
                }
                if client.ping().is_err() {
                    break;
                }
            }
        }
    }

    let removed = broker.disconnect(&client_id);
    writer.abort();
    info!(client = %client_id, subscriptions = removed, "client disconnected");
}

/// Per-connection protocol state.
struct Session<'a> {
    broker: &'a Broker,
    client: &'a Client,
    endpoint: &'a Arc<dyn Endpoint>,
    subscriptions: HashMap<String, SubscriptionId>,
}

impl Session<'_> {
    async fn handle_text(&mut self, text: &str) {
        let reply = match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Subscribe { topic }) => self.subscribe(topic),
            Ok(ClientMessage::Unsubscribe { topic }) => self.unsubscribe(topic),
            Ok(ClientMessage::Publish { topic, payload }) => {
                match self.broker.publish(&topic, Bytes::from(payload)).await {
                    Ok(delivered) => ServerMessage::Published { topic, delivered },
                    Err(e) => ServerMessage::error(e),
                }
            }
            // Anything that is not a protocol object names a topic.
            Err(_) if !text.trim_start().starts_with('{') => {
                self.subscribe(text.trim().to_string())
            }
            Err(err) => {
                warn!(
                    client = %self.client.id,
                    "Invalid client message: {err} | {}",
                    text.chars().take(100).collect::<String>()
                );
                ServerMessage::error(format!("invalid message: {err}"))
            }
        };

        if let Err(e) = self.client.reply(&reply).await {
            debug!(client = %self.client.id, "failed to queue reply: {e}");
        }
    }

    fn subscribe(&mut self, topic: String) -> ServerMessage {
        match self.broker.subscribe(&topic, self.endpoint) {
            Ok(subscription_id) => {
                info!(client = %self.client.id, topic = %topic, "subscribed");
                self.subscriptions.insert(topic.clone(), subscription_id);
                ServerMessage::Subscribed {
                    topic,
                    subscription_id,
                }
            }
            Err(e) => ServerMessage::error(e),
        }
    }

    fn unsubscribe(&mut self, topic: String) -> ServerMessage {
        if let Some(handle) = self.subscriptions.remove(&topic) {
            self.broker.unsubscribe(handle);
            info!(client = %self.client.id, topic = %topic, "unsubscribed");
        }
        ServerMessage::Unsubscribed { topic }
    }
}
