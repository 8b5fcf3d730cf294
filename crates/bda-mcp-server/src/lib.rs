//! Model Context Protocol server surface.
//!
//! Holds everything protocol-shaped: JSON-RPC messages, the tool envelope and
//! typed registry, the dispatcher, and the stdio/HTTP transports. Nothing here
//! knows about the tools the application registers.

pub mod config;
pub mod dispatch;
pub mod protocol;
mod server;
pub mod stdio;
pub mod tool;

pub use config::{ServerConfig, Transport};
pub use dispatch::McpServer;
pub use protocol::ServerInfo;
pub use server::{MCP_PATH, ServerError, build_mcp_router, serve_http};
pub use stdio::{TransportError, serve_lines, serve_stdio};
pub use tool::{
    NoArguments, Tool, ToolCallError, ToolContent, ToolDefinition, ToolRegistry,
    ToolRegistryError, ToolResult,
};
