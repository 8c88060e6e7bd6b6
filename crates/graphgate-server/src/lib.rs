//! graphgate-server: exposes the gateway operations to a calling agent.
//!
//! The [`registry::ToolRegistry`] maps tool names to gateway operations and
//! [`handler::GraphGateServer`] serves them as MCP tools over stdio.

pub mod error;
pub mod handler;
pub mod registry;
