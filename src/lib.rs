//! Dexcom MCP Server
//!
//! A Model Context Protocol (MCP) server that lets tool-calling clients read
//! a Dexcom CGM: the current glucose value and recent history.
//!
//! # Architecture
//!
//! 1. **Dexcom Layer** (`dexcom`) - Share API client behind the `GlucoseProvider` trait
//! 2. **MCP Layer** (`mcp`) - JSON-RPC types, tool registry, request dispatcher
//! 3. **Tools Layer** (`tools`) - `get_current_glucose`, `get_glucose_history`
//! 4. **HTTP Layer** (`http`) - axum transport, health and metrics endpoints

pub mod config;
pub mod dexcom;
pub mod error;
pub mod http;
pub mod mcp;
pub mod metrics;
pub mod tools;

pub use error::{Error, Result};

/// Server version reported in `initialize`.
pub const VERSION: &str = "1.0.0";

/// Server name reported in `initialize`.
pub const SERVER_NAME: &str = "dexcom-monitor";
