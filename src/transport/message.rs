//! WebSocket wire protocol. Every frame is a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::endpoint::SubscriptionId;
use crate::utils::error::DeliveryError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
    Publish { topic: String, payload: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Subscribed {
        topic: String,
        subscription_id: SubscriptionId,
    },
    Unsubscribed {
        topic: String,
    },
    Published {
        topic: String,
        delivered: usize,
    },
    Message {
        topic: String,
        payload: String,
        timestamp: i64,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }

    pub fn to_frame(&self) -> Result<WsMessage, DeliveryError> {
        serde_json::to_string(self)
            .map(WsMessage::text)
            .map_err(|e| DeliveryError::Encode(e.to_string()))
    }
}
