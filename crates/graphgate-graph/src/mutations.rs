//! Write operations.
//!
//! Writes are forwarded verbatim; the gateway only reports the update
//! counters the database returns for them.

use graphgate_core::{GatewayError, ModifyResult, WriteSummary};

use crate::session::GraphSession;

/// Run a write statement and report what it changed.
pub async fn apply_write<S: GraphSession>(
    session: &mut S,
    statement: &str,
) -> Result<WriteSummary, GatewayError> {
    let summary = session.apply(statement).await?;
    tracing::debug!(
        nodes_created = summary.nodes_created,
        nodes_deleted = summary.nodes_deleted,
        relationships_created = summary.relationships_created,
        relationships_deleted = summary.relationships_deleted,
        properties_set = summary.properties_set,
        "Write applied"
    );
    Ok(summary)
}

/// Run a statement that already passed the write guard.
pub async fn modify_graph<S: GraphSession>(
    session: &mut S,
    statement: &str,
) -> Result<ModifyResult, GatewayError> {
    apply_write(session, statement).await.map(ModifyResult::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Connector;
    use crate::testing::ScriptedConnector;
    use graphgate_core::ConnectionConfig;

    #[tokio::test]
    async fn test_modify_graph_reports_counters() {
        let connector = ScriptedConnector::new();
        connector.write(
            "MATCH (a:Person {name:'A'}) CREATE (a)-[:KNOWS]->(:Person {name:'B'})",
            WriteSummary {
                nodes_created: 1,
                relationships_created: 1,
                properties_set: 1,
                ..Default::default()
            },
        );
        let mut session = connector
            .open(&ConnectionConfig::new("bolt://test"))
            .await
            .unwrap();

        let result = modify_graph(
            &mut session,
            "MATCH (a:Person {name:'A'}) CREATE (a)-[:KNOWS]->(:Person {name:'B'})",
        )
        .await
        .unwrap();
        assert_eq!(result.affected_items, 3);
        assert_eq!(result.summary.relationships_created, 1);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["summary"]["nodes_created"], 1);
        assert_eq!(json["affected_items"], 3);
    }

    #[tokio::test]
    async fn test_apply_write_failure_is_query_error() {
        let connector = ScriptedConnector::new();
        connector.fail("CREATE (n:Person {id: 1})", "Constraint violation");
        let mut session = connector
            .open(&ConnectionConfig::new("bolt://test"))
            .await
            .unwrap();

        let err = apply_write(&mut session, "CREATE (n:Person {id: 1})")
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Query("Constraint violation".to_string()));
    }
}
