//! Configuration management for the Dexcom MCP server.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::dexcom::{Credentials, Region};
use crate::error::{Error, Result};

/// Command-line arguments for the Dexcom MCP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "dexcom-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server exposing Dexcom CGM glucose readings over HTTP")]
pub struct Args {
    /// Dexcom Share account username
    #[arg(short, long, env = "DEXCOM_USERNAME")]
    pub username: Option<String>,

    /// Dexcom Share account password
    #[arg(long, env = "DEXCOM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Dexcom Share region: us, ous or jp
    #[arg(short, long, default_value = "us", env = "DEXCOM_REGION")]
    pub region: Region,

    /// HTTP bind address
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// HTTP port
    #[arg(short, long, default_value = "8007", env = "HTTP_PORT")]
    pub port: u16,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", env = "DEXCOM_MCP_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Enable debug logging
    #[arg(short, long, env = "DEXCOM_MCP_DEBUG")]
    pub debug: bool,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dexcom username
    pub username: Option<String>,
    /// Dexcom password
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Dexcom region
    pub region: Region,
    /// HTTP bind host
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Request timeout (seconds)
    pub request_timeout: u64,
    /// Debug mode
    pub debug: bool,
}

impl Config {
    /// Dexcom credentials, if both username and password are non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().filter(|s| !s.is_empty())?;
        let password = self.password.as_deref().filter(|s| !s.is_empty())?;
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
            region: self.region,
        })
    }

    /// Socket address to bind the HTTP server to.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address {}:{}: {}", self.host, self.port, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            username: args.username,
            password: args.password,
            region: args.region,
            host: args.host,
            port: args.port,
            request_timeout: args.request_timeout,
            debug: args.debug,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            region: Region::Us,
            host: "0.0.0.0".to_string(),
            port: 8007,
            request_timeout: 30,
            debug: false,
        }
    }
}
