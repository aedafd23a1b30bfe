use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::endpoint::{Endpoint, SubscriberId};
use crate::broker::message::Message;
use crate::transport::message::ServerMessage;
use crate::utils::error::DeliveryError;

/// Represents a connected WebSocket client in the broker.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the client, a UUID assigned on connect.
    pub id: SubscriberId,

    /// Channel to the connection's writer task.
    sender: Sender<WsMessage>,
}

impl Client {
    pub fn new(sender: Sender<WsMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// Queues a protocol reply for this client.
    pub async fn reply(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        let frame = message.to_frame()?;
        self.push(frame).await
    }

    /// Queues a keepalive ping without waiting. A full buffer skips the
    /// ping; the idle deadline covers a peer that stopped reading.
    pub fn ping(&self) -> Result<(), DeliveryError> {
        match self.sender.try_send(WsMessage::Ping(Bytes::new())) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    async fn push(&self, frame: WsMessage) -> Result<(), DeliveryError> {
        self.sender
            .send(frame)
            .await
            .map_err(|_| DeliveryError::Closed)
    }
}

#[async_trait]
impl Endpoint for Client {
    fn id(&self) -> &str {
        &self.id
    }

    /// UTF-8 payloads go out as a JSON `message` envelope; anything else is
    /// sent as a raw binary frame.
    async fn send(&self, message: Arc<Message>) -> Result<(), DeliveryError> {
        let frame = match std::str::from_utf8(&message.payload) {
            Ok(text) => ServerMessage::Message {
                topic: message.topic.clone(),
                payload: text.to_string(),
                timestamp: message.timestamp,
            }
            .to_frame()?,
            Err(_) => WsMessage::Binary(message.payload.clone()),
        };
        self.push(frame).await
    }
}
