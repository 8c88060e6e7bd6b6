//! Result types returned by the gateway operations.
//!
//! These are the shapes handed back to the calling agent, so their serialized
//! field names are part of the external contract.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One result row: field name to value, in the order of the RETURN clause.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ── Schema & Stats ────────────────────────────────────────────────

/// Labels, relationship types, and property keys currently present in the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub node_labels: BTreeSet<String>,
    pub relationship_types: BTreeSet<String>,
    pub properties: BTreeSet<String>,
}

/// Entity counts, overall and grouped.
///
/// A node with several labels is counted once under each of them, so the
/// per-label sum can exceed `node_count`. Every relationship has exactly one
/// type, so the per-type sum equals `relationship_count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub node_count: i64,
    pub relationship_count: i64,
    pub node_counts_by_label: BTreeMap<String, i64>,
    pub relationship_counts_by_type: BTreeMap<String, i64>,
}

// ── Writes ────────────────────────────────────────────────────────

/// Update counters reported by the database for one write statement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteSummary {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
}

impl WriteSummary {
    /// Number of affected items: the sum of all five counters.
    pub fn total(&self) -> u64 {
        self.nodes_created
            + self.nodes_deleted
            + self.relationships_created
            + self.relationships_deleted
            + self.properties_set
    }
}

/// Result of `modify_graph`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModifyResult {
    pub status: &'static str,
    pub message: &'static str,
    pub summary: WriteSummary,
    pub affected_items: u64,
}

impl From<WriteSummary> for ModifyResult {
    fn from(summary: WriteSummary) -> Self {
        Self {
            status: "success",
            message: "Graph modified successfully",
            affected_items: summary.total(),
            summary,
        }
    }
}

// ── Batches ───────────────────────────────────────────────────────

/// What happened to one statement of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// A read statement and the rows it returned.
    Rows(Vec<Record>),
    /// A write statement and its affected-item count.
    Affected(u64),
    /// The statement failed; the message is the database's.
    Failed(String),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// One entry of a [`BatchResult`], in input position.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemResult {
    pub index: usize,
    pub statement: String,
    pub outcome: ItemOutcome,
}

impl BatchItemResult {
    pub fn status(&self) -> &'static str {
        if self.outcome.is_success() {
            "success"
        } else {
            "error"
        }
    }
}

impl Serialize for BatchItemResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("query_index", &self.index)?;
        map.serialize_entry("query", &self.statement)?;
        map.serialize_entry("status", self.status())?;
        match &self.outcome {
            ItemOutcome::Rows(rows) => map.serialize_entry("results", rows)?,
            ItemOutcome::Affected(count) => map.serialize_entry("affected_items", count)?,
            ItemOutcome::Failed(message) => map.serialize_entry("error", message)?,
        }
        map.end()
    }
}

/// Result of `execute_multiple_queries`.
///
/// Counts are derived from `results`, so `successful_queries + failed_queries
/// == total_queries == results.len()` always holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchResult {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchResult {
    pub fn from_items(results: Vec<BatchItemResult>) -> Self {
        let successful_queries = results.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            total_queries: results.len(),
            successful_queries,
            failed_queries: results.len() - successful_queries,
            results,
        }
    }
}
