//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides protocol-level specifics surrounding JSON-RPC classification,
//! routing, formatting, and error mapping.

pub mod rpc;
pub mod server;
