//! graphgate-graph: the graph-query gateway.
//!
//! Every operation runs on its own Bolt session: statements are forwarded
//! verbatim, classified only by their leading keyword, and batches isolate
//! failures per statement. The database itself is reached through the
//! [`Connector`] seam so the gateway can be driven without a live server.

pub mod batch;
pub mod classify;
pub mod client;
pub mod gateway;
pub mod mutations;
pub mod queries;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classify::{check_write, classify, StatementKind};
pub use client::{BoltConnector, BoltSession, GraphError};
pub use gateway::Gateway;
pub use session::{ConnectionManager, Connector, GraphSession, SessionGuard};
