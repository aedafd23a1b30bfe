use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP and WebSocket listeners bind.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub http_port: u16,
    pub ws_port: u16,
    /// How often an idle WebSocket connection is pinged.
    pub ws_ping_interval_ms: u64,
    /// A connection that sends nothing, not even a pong, for this long is
    /// closed.
    pub ws_idle_timeout_ms: u64,
}

/// Configuration settings for the broker core.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    /// Upper bound on a single subscriber delivery.
    pub delivery_timeout_ms: u64,
    /// Outbound frames buffered per WebSocket connection.
    pub subscriber_buffer: usize,
    pub max_payload_bytes: usize,
    /// Cap on long-poll dequeue waits.
    pub max_wait_ms: u64,
    /// Largest item count a single fill request may ask for.
    pub max_fill: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub http_port: Option<u16>,
    pub ws_port: Option<u16>,
    pub ws_ping_interval_ms: Option<u64>,
    pub ws_idle_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub delivery_timeout_ms: Option<u64>,
    pub subscriber_buffer: Option<usize>,
    pub max_payload_bytes: Option<usize>,
    pub max_wait_ms: Option<u64>,
    pub max_fill: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let broker = self.broker.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                http_port: server.http_port.unwrap_or(default.server.http_port),
                ws_port: server.ws_port.unwrap_or(default.server.ws_port),
                ws_ping_interval_ms: server
                    .ws_ping_interval_ms
                    .unwrap_or(default.server.ws_ping_interval_ms),
                ws_idle_timeout_ms: server
                    .ws_idle_timeout_ms
                    .unwrap_or(default.server.ws_idle_timeout_ms),
            },
            broker: BrokerSettings {
                delivery_timeout_ms: broker
                    .delivery_timeout_ms
                    .unwrap_or(default.broker.delivery_timeout_ms),
                subscriber_buffer: broker
                    .subscriber_buffer
                    .unwrap_or(default.broker.subscriber_buffer),
                max_payload_bytes: broker
                    .max_payload_bytes
                    .unwrap_or(default.broker.max_payload_bytes),
                max_wait_ms: broker.max_wait_ms.unwrap_or(default.broker.max_wait_ms),
                max_fill: broker.max_fill.unwrap_or(default.broker.max_fill),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(default.logging.level),
            },
        }
    }
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            broker: BrokerSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            http_port: 8080,
            ws_port: 8081,
            ws_ping_interval_ms: 15_000,
            ws_idle_timeout_ms: 45_000,
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: 1000,
            subscriber_buffer: 256,
            max_payload_bytes: 1024 * 1024,
            max_wait_ms: 30_000,
            max_fill: 100_000,
        }
    }
}
