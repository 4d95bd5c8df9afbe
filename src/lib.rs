//! klipper-mcp: MCP server for inspecting Klipper 3D printers
//!
//! This library parses Klipper configuration files and exposes them, along
//! with logs and live printer state, as read-only tools for AI assistants.
//! Files are fetched through the Moonraker HTTP API.
//!
//! # Architecture
//!
//! - **Parsing**: `[section]` headers, `key: value` / `key = value` lines,
//!   continuation lines, `[include ...]` directives and typed values
//! - **Validation**: section name syntax, pin descriptors and numeric ranges
//!   for well-known parameters, reported per line
//! - **Moonraker**: config files, logs and printer objects over HTTP
//!
//! Nothing here writes to the printer.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`klipper`]: Configuration parser
//! - [`mcp`]: MCP protocol implementation
//! - [`moonraker`]: Moonraker API client

pub mod config;
pub mod error;
pub mod klipper;
pub mod mcp;
pub mod moonraker;
