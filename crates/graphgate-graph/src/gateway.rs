//! The five gateway operations.
//!
//! Each call opens its own session, does its work, and releases the session
//! before returning. Nothing is carried over between calls.

use graphgate_core::{
    BatchResult, ConnectionConfig, GatewayError, ModifyResult, Record, SchemaSnapshot,
    StatsSnapshot,
};

use crate::batch::run_batch;
use crate::classify::check_write;
use crate::client::BoltConnector;
use crate::mutations::modify_graph;
use crate::queries::{execute, schema_snapshot, stats_snapshot};
use crate::session::{ConnectionManager, Connector};

/// Entry point used by the transport layer.
pub struct Gateway<C = BoltConnector> {
    manager: ConnectionManager<C>,
}

impl Gateway<BoltConnector> {
    /// Gateway speaking Bolt through neo4rs.
    pub fn bolt(config: ConnectionConfig) -> Self {
        Self::new(ConnectionManager::new(config, BoltConnector))
    }
}

impl<C: Connector> Gateway<C> {
    pub fn new(manager: ConnectionManager<C>) -> Self {
        Self { manager }
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.manager.config()
    }

    /// Run any statement and return its rows.
    pub async fn execute_query(&self, statement: &str) -> Result<Vec<Record>, GatewayError> {
        let mut session = self.manager.acquire().await?;
        let result = execute(&mut *session, statement).await;
        session.release();
        result
    }

    /// Labels, relationship types, and property keys currently in the graph.
    pub async fn get_schema_info(&self) -> Result<SchemaSnapshot, GatewayError> {
        let mut session = self.manager.acquire().await?;
        let result = schema_snapshot(&mut *session).await;
        session.release();
        result
    }

    /// Node and relationship counts, overall and grouped.
    pub async fn get_database_stats(&self) -> Result<StatsSnapshot, GatewayError> {
        let mut session = self.manager.acquire().await?;
        let result = stats_snapshot(&mut *session).await;
        session.release();
        result
    }

    /// Run a write statement. Anything that is not a write is rejected
    /// before a connection is opened.
    pub async fn modify_graph(&self, statement: &str) -> Result<ModifyResult, GatewayError> {
        check_write(statement)?;

        let mut session = self.manager.acquire().await?;
        let result = modify_graph(&mut *session, statement).await;
        session.release();
        result
    }

    /// Run statements in order on one session, isolating failures per statement.
    pub async fn execute_multiple_queries(
        &self,
        statements: Vec<String>,
    ) -> Result<BatchResult, GatewayError> {
        let mut session = self.manager.acquire().await?;
        let result = run_batch(&mut *session, statements).await;
        session.release();
        Ok(result)
    }
}
