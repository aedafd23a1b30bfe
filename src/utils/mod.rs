//! The `utils` module provides the shared plumbing used across `trimq`:
//! the broker error taxonomy and tracing initialization.

pub mod error;
pub mod logging;

pub use error::{BrokerError, DeliveryError};
