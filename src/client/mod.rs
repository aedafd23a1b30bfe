//! The `client` module defines the broker-side representation of a connected
//! WebSocket client.
//!
//! A `Client` is the subscriber endpoint the transport registers with the
//! broker: it owns the sending half of a bounded per-connection channel that
//! the connection's writer task drains onto the socket.

pub mod pubsub_client;
pub use pubsub_client::Client;
