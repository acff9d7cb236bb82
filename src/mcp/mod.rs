//! Model Context Protocol (MCP) implementation.
//!
//! # Architecture
//!
//! - `protocol` - JSON-RPC envelopes, method decoding, MCP result types
//! - `handler` - Tool registry and argument decoding
//! - `server` - Request dispatcher

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::{GlucoseTool, McpHandler, ToolCall};
pub use protocol::*;
pub use server::McpServer;
