//! Dexcom MCP Server
//!
//! Serves Dexcom CGM readings to MCP clients over HTTP.

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dexcom_mcp::config::{Args, Config};
use dexcom_mcp::dexcom::{DexcomClient, GlucoseProvider};
use dexcom_mcp::error::Result;
use dexcom_mcp::mcp::{McpHandler, McpServer};
use dexcom_mcp::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config: Config = args.into();

    info!("Dexcom MCP Server v{}", VERSION);
    info!("Region: {:?}", config.region);

    let provider: Option<Arc<dyn GlucoseProvider>> = match config.credentials() {
        Some(credentials) => match DexcomClient::connect(&credentials).await {
            Ok(client) => {
                info!("Dexcom client initialized successfully");
                Some(Arc::new(client) as Arc<dyn GlucoseProvider>)
            }
            Err(e) => {
                error!("Failed to initialize Dexcom client: {}", e);
                None
            }
        },
        None => {
            warn!("DEXCOM_USERNAME/DEXCOM_PASSWORD not set; tool calls will fail");
            None
        }
    };

    let handler = McpHandler::new(provider);
    info!("Registered {} MCP tools", handler.tool_count());

    let server = Arc::new(McpServer::new(handler));
    dexcom_mcp::http::start_server(&config, server).await?;

    Ok(())
}
