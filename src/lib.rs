//! # trimq
//!
//! `trimq` is an in-memory message broker served over HTTP and WebSocket.
//! It offers three point-to-point queueing disciplines and a topic-based
//! publish/subscribe channel that fans out to live WebSocket subscribers.
//!
//! ## Core Modules
//!
//! - `broker`: item stores (`list`, `queue`, `deque`), the topic registry,
//!   and the publisher that delivers to subscribers.
//! - `client`: the subscriber endpoint backing one WebSocket connection.
//! - `config`: layered configuration loading.
//! - `transport`: the HTTP API and the WebSocket server.
//! - `utils`: error types and logging setup.
//!
//! Nothing is persisted; all state lives in process memory.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use broker::{Broker, BrokerOptions};
pub use crate::config::{Settings, load_config};
