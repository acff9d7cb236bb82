//! MCP tool implementations.
//!
//! - `glucose` - Current reading and history (2 tools)
//!
//! Tool names, descriptions and schemas live in
//! [`GlucoseTool`](crate::mcp::handler::GlucoseTool); this module holds the
//! code that runs them.

pub mod glucose;
