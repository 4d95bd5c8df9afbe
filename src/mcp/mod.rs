//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes read-only Klipper tooling to AI assistants over stdio using
//! JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│   Server    │───▶│   Tools     │    │
//! │   │   (stdio)   │    │  (lifecycle)│    │  (handlers) │    │
//! │   └─────────────┘    └─────────────┘    └──────┬──────┘    │
//! │                                                │            │
//! │                              ┌─────────────────┴─────┐      │
//! │                              ▼                       ▼      │
//! │                       ┌─────────────┐        ┌───────────┐  │
//! │                       │   Parser    │        │ Moonraker │  │
//! │                       │  (klipper)  │        │  (HTTP)   │  │
//! │                       └─────────────┘        └───────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! Versions 2025-03-26 and 2024-11-05 are accepted; the client's version is
//! echoed when supported.

pub mod format;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use tools::{ToolCallResult, ToolHandler};
pub use transport::StdioTransport;
