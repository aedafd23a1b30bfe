//! trimq server
//!
//! Starts the HTTP queue API and the WebSocket subscriber endpoint against
//! one shared broker.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use trimq::broker::{Broker, BrokerOptions};
use trimq::config::{self, Settings};
use trimq::transport::http::start_http_server;
use trimq::transport::websocket::{WebSocketOptions, start_websocket_server};
use trimq::utils::logging;

#[derive(Parser)]
#[command(name = "trimq", version, about = "In-memory list/queue/deque and pub/sub broker")]
struct Args {
    /// Configuration file; defaults to config/default.* when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overrides the configured one (RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings: Settings = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    logging::init(args.log_level.as_deref().unwrap_or(&settings.logging.level));

    let broker = Arc::new(Broker::new(BrokerOptions::from(&settings.broker)));
    let http_addr = format!("{}:{}", settings.server.host, settings.server.http_port);
    let ws_addr = format!("{}:{}", settings.server.host, settings.server.ws_port);
    let ws_options = WebSocketOptions::from(&settings);

    tokio::select! {
        res = start_http_server(&http_addr, broker.clone()) => {
            error!("HTTP server exited unexpectedly: {:?}", res);
        }
        res = start_websocket_server(&ws_addr, broker.clone(), ws_options) => {
            error!("WebSocket server exited unexpectedly: {:?}", res);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}
