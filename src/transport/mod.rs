//! The `transport` module holds the adapters the broker core is called from:
//! an HTTP API for the item stores and publishing, and a WebSocket server
//! for topic subscribers.

pub mod http;
pub mod message;
pub mod websocket;
