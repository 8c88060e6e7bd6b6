//! Bolt connection handling on top of neo4rs.

use neo4rs::summary::Counters;
use neo4rs::{query, ConfigBuilder, Graph, Row};

use graphgate_core::{ConnectionConfig, GatewayError, Record, WriteSummary};

use crate::session::{Connector, GraphSession};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Query(#[from] neo4rs::Error),

    /// A statement failure reported as plain text (used by non-Bolt backends).
    #[error("{0}")]
    Statement(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<GraphError> for GatewayError {
    fn from(e: GraphError) -> Self {
        GatewayError::Query(e.to_string())
    }
}

/// Opens Bolt sessions with neo4rs. Works against Memgraph and Neo4j.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoltConnector;

impl Connector for BoltConnector {
    type Session = BoltSession;

    async fn open(&self, config: &ConnectionConfig) -> Result<BoltSession, GraphError> {
        // Without both credentials we send an empty principal, which
        // deployments with authentication disabled accept.
        let (user, password) = config.credentials().unwrap_or(("", ""));

        let neo_config = ConfigBuilder::default()
            .uri(config.uri.trim())
            .user(user)
            .password(password)
            .max_connections(1)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        // Only builds the pool; the first statement (the liveness probe)
        // is what actually dials the server.
        let graph = Graph::connect(neo_config).map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::debug!(
            uri = %config.uri,
            authenticated = config.credentials().is_some(),
            "Bolt driver created"
        );
        Ok(BoltSession { graph: Some(graph) })
    }
}

/// A single-connection neo4rs graph handle scoped to one operation.
pub struct BoltSession {
    graph: Option<Graph>,
}

impl BoltSession {
    fn graph(&self) -> Result<&Graph, GraphError> {
        self.graph
            .as_ref()
            .ok_or_else(|| GraphError::Connection("session already closed".to_string()))
    }
}

impl GraphSession for BoltSession {
    async fn fetch(&mut self, statement: &str) -> Result<Vec<Record>, GraphError> {
        let mut stream = self.graph()?.execute(query(statement)).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row_to_record(&row, statement)?);
        }
        Ok(rows)
    }

    async fn apply(&mut self, statement: &str) -> Result<WriteSummary, GraphError> {
        let mut stream = self.graph()?.execute(query(statement)).await?;
        while stream.next().await?.is_some() {}
        let summary = stream.finish().await?;
        Ok(write_summary(summary.stats()))
    }

    fn close(&mut self) {
        // Dropping the last handle shuts the pool and its connection down.
        self.graph.take();
    }
}

/// The update counters the gateway reports, taken from a result summary.
fn write_summary(counters: &Counters) -> WriteSummary {
    WriteSummary {
        nodes_created: counters.nodes_created,
        nodes_deleted: counters.nodes_deleted,
        relationships_created: counters.relationships_created,
        relationships_deleted: counters.relationships_deleted,
        properties_set: counters.properties_set,
    }
}

/// Convert a neo4rs row into a [`Record`] ordered like the RETURN clause.
fn row_to_record(row: &Row, statement: &str) -> Result<Record, GraphError> {
    let keys: Vec<String> = row.keys().into_iter().map(|k| k.value.clone()).collect();

    let mut record = Record::new();
    for key in column_order(statement, keys) {
        let value: serde_json::Value = row.get(&key).map_err(|e| {
            GraphError::Serialization(format!("Failed to read field '{key}': {e}"))
        })?;
        record.insert(key, value);
    }
    Ok(record)
}

/// Order result columns by where they appear in the final RETURN clause.
///
/// neo4rs keeps row fields in a hash map, so the column order announced by
/// the server is lost. Each key is located in the text after the last
/// `RETURN`, preferring an `AS <key>` alias; keys that cannot be located keep
/// their relative order and go last.
fn column_order(statement: &str, mut keys: Vec<String>) -> Vec<String> {
    let Some(start) = last_keyword(statement, "RETURN") else {
        return keys;
    };
    let clause = &statement[start + "RETURN".len()..];

    keys.sort_by_key(|key| find_word(clause, key).unwrap_or(usize::MAX));
    keys
}

/// Byte offset of the last standalone, case-insensitive `keyword`.
///
/// Occurrences inside quoted literals or backticked names, or as part of a
/// longer identifier such as `n.return_date`, do not count.
fn last_keyword(statement: &str, keyword: &str) -> Option<usize> {
    let bytes = statement.as_bytes();
    let kw = keyword.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b >= 0x80;

    let mut quote: Option<u8> = None;
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if matches!(b, b'\'' | b'"' | b'`') => quote = Some(b),
            None => {
                let end = i + kw.len();
                if end <= bytes.len()
                    && bytes[i..end].eq_ignore_ascii_case(kw)
                    && (i == 0 || !is_ident(bytes[i - 1]))
                    && bytes.get(end).map_or(true, |&next| !is_ident(next))
                {
                    found = Some(i);
                    i = end;
                    continue;
                }
            }
        }
        i += 1;
    }
    found
}

/// Byte offset of `word` in `haystack` where it is not part of a longer identifier.
///
/// When the word occurs after `AS`, that occurrence wins over earlier ones.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let mut first = None;

    for (at, _) in haystack.match_indices(word) {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + word.len()..].chars().next();
        if before.is_some_and(is_ident) || after.is_some_and(is_ident) {
            continue;
        }
        if haystack[..at].trim_end().to_ascii_uppercase().ends_with(" AS") {
            return Some(at);
        }
        first.get_or_insert(at);
    }
    first
}
