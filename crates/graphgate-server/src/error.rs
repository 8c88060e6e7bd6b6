//! Error types for the graphgate-server crate.

use graphgate_core::GatewayError;
use thiserror::Error;

/// Why a tool call could not produce a result.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The operation ran and failed; reported to the agent as a tool error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
