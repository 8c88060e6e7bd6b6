//! Read operations: verbatim execution, schema introspection, and statistics.

use std::collections::{BTreeMap, BTreeSet};

use graphgate_core::{GatewayError, Record, SchemaSnapshot, StatsSnapshot};

use crate::session::GraphSession;

const LABELS_QUERY: &str = "MATCH (n) RETURN DISTINCT labels(n) AS labels";

const REL_TYPES_QUERY: &str = "MATCH ()-[r]->() RETURN DISTINCT type(r) AS type";

const PROPERTIES_QUERY: &str = "MATCH (n)
     UNWIND keys(n) AS property
     RETURN DISTINCT property
     UNION
     MATCH ()-[r]->()
     UNWIND keys(r) AS property
     RETURN DISTINCT property";

const NODE_COUNT_QUERY: &str = "MATCH (n) RETURN count(n) AS node_count";

const REL_COUNT_QUERY: &str = "MATCH ()-[r]->() RETURN count(r) AS rel_count";

const LABEL_COUNTS_QUERY: &str = "MATCH (n)
     WITH labels(n) AS labels
     UNWIND labels AS label
     RETURN label, count(*) AS count";

const REL_TYPE_COUNTS_QUERY: &str = "MATCH ()-[r]->()
     RETURN type(r) AS type, count(*) AS count";

// ── Statement Execution ──────────────────────────────────────────

/// Run any statement verbatim and return its rows.
pub async fn execute<S: GraphSession>(
    session: &mut S,
    statement: &str,
) -> Result<Vec<Record>, GatewayError> {
    let rows = session.fetch(statement).await?;
    tracing::debug!(rows = rows.len(), "Statement executed");
    Ok(rows)
}

// ── Schema ───────────────────────────────────────────────────────

/// Collect the labels, relationship types, and property keys present in the graph.
pub async fn schema_snapshot<S: GraphSession>(
    session: &mut S,
) -> Result<SchemaSnapshot, GatewayError> {
    let mut snapshot = SchemaSnapshot::default();

    for row in session.fetch(LABELS_QUERY).await? {
        if let Some(labels) = row.get("labels").and_then(|v| v.as_array()) {
            snapshot
                .node_labels
                .extend(labels.iter().filter_map(|l| l.as_str()).map(str::to_string));
        }
    }

    snapshot.relationship_types = string_column(session.fetch(REL_TYPES_QUERY).await?, "type");
    snapshot.properties = string_column(session.fetch(PROPERTIES_QUERY).await?, "property");

    tracing::debug!(
        labels = snapshot.node_labels.len(),
        relationship_types = snapshot.relationship_types.len(),
        properties = snapshot.properties.len(),
        "Schema collected"
    );
    Ok(snapshot)
}

fn string_column(rows: Vec<Record>, field: &str) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|row| row.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect()
}

// ── Statistics ───────────────────────────────────────────────────

/// Count nodes and relationships, overall and grouped by label / type.
pub async fn stats_snapshot<S: GraphSession>(
    session: &mut S,
) -> Result<StatsSnapshot, GatewayError> {
    let node_count = scalar_count(session.fetch(NODE_COUNT_QUERY).await?, "node_count");
    let relationship_count = scalar_count(session.fetch(REL_COUNT_QUERY).await?, "rel_count");
    let node_counts_by_label = grouped_counts(session.fetch(LABEL_COUNTS_QUERY).await?, "label");
    let relationship_counts_by_type =
        grouped_counts(session.fetch(REL_TYPE_COUNTS_QUERY).await?, "type");

    Ok(StatsSnapshot {
        node_count,
        relationship_count,
        node_counts_by_label,
        relationship_counts_by_type,
    })
}

fn scalar_count(rows: Vec<Record>, field: &str) -> i64 {
    rows.first()
        .and_then(|row| row.get(field))
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
}

/// Fold `(key, count)` rows into a map, summing repeated keys and dropping zeros.
fn grouped_counts(rows: Vec<Record>, key_field: &str) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for row in &rows {
        let key = row.get(key_field).and_then(|v| v.as_str());
        let count = row.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
        if let Some(key) = key {
            *counts.entry(key.to_string()).or_insert(0) += count;
        }
    }
    counts.retain(|_, count| *count > 0);
    counts
}
