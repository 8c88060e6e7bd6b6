//! graphgate-core: Shared types, configuration, and error handling for graphgate.
//!
//! This crate provides the foundational pieces used by the gateway crates:
//! - Result types returned by the gateway operations (records, snapshots, batch results)
//! - Connection configuration loading
//! - The gateway error taxonomy

pub mod config;
pub mod error;
pub mod types;

pub use config::ConnectionConfig;
pub use error::{GatewayError, Result};
pub use types::{
    BatchItemResult, BatchResult, ItemOutcome, ModifyResult, Record, SchemaSnapshot,
    StatsSnapshot, WriteSummary,
};
