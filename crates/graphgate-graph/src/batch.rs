//! Sequential multi-statement execution with per-item failure isolation.
//!
//! Statements run strictly in input order on one session: later statements may
//! rely on what earlier ones created. A failing statement is recorded on its
//! own item and never stops the rest of the batch.

use graphgate_core::{BatchItemResult, BatchResult, GatewayError, ItemOutcome};

use crate::classify::{classify, StatementKind};
use crate::mutations::apply_write;
use crate::queries::execute;
use crate::session::GraphSession;

/// Run every statement in order and collect one result per statement.
pub async fn run_batch<S, I>(session: &mut S, statements: I) -> BatchResult
where
    S: GraphSession,
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut results = Vec::new();

    for (index, statement) in statements.into_iter().enumerate() {
        let statement: String = statement.into();

        let outcome = match classify(&statement) {
            StatementKind::Read => execute(session, &statement).await.map(ItemOutcome::Rows),
            StatementKind::Write | StatementKind::Unclassified => apply_write(session, &statement)
                .await
                .map(|summary| ItemOutcome::Affected(summary.total())),
        }
        .unwrap_or_else(|e| {
            tracing::warn!(index, error = %e, "Batch statement failed");
            // Keep the database's own message on the item.
            let message = match e {
                GatewayError::Query(message) => message,
                other => other.to_string(),
            };
            ItemOutcome::Failed(message)
        });

        results.push(BatchItemResult {
            index,
            statement,
            outcome,
        });
    }

    let batch = BatchResult::from_items(results);
    tracing::info!(
        total = batch.total_queries,
        succeeded = batch.successful_queries,
        failed = batch.failed_queries,
        "Batch finished"
    );
    batch
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::Connector;
    use crate::testing::{record, ScriptedConnector, ScriptedSession};
    use graphgate_core::{ConnectionConfig, WriteSummary};

    async fn session(connector: &ScriptedConnector) -> ScriptedSession {
        connector
            .open(&ConnectionConfig::new("bolt://test"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_match() {
        let connector = ScriptedConnector::new();
        connector.write(
            "CREATE (n:Person {name:'A'})",
            WriteSummary {
                nodes_created: 1,
                ..Default::default()
            },
        );
        connector.rows(
            "MATCH (n:Person) RETURN n.name AS name",
            vec![record(&[("name", json!("A"))])],
        );
        let mut session = session(&connector).await;

        let batch = run_batch(
            &mut session,
            [
                "CREATE (n:Person {name:'A'})",
                "MATCH (n:Person) RETURN n.name AS name",
            ],
        )
        .await;

        assert_eq!(batch.total_queries, 2);
        assert_eq!(batch.successful_queries, 2);
        assert_eq!(batch.results[0].outcome, ItemOutcome::Affected(1));
        assert_eq!(
            batch.results[1].outcome,
            ItemOutcome::Rows(vec![record(&[("name", json!("A"))])])
        );
        assert_eq!(
            connector.executed(),
            vec![
                "CREATE (n:Person {name:'A'})".to_string(),
                "MATCH (n:Person) RETURN n.name AS name".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let statements = [
            "CREATE (a:Node {id: 1})",
            "CREATE (b:Node {id: 2})",
            "MATCH (n:Node RETURN n",
            "MATCH (n:Node) RETURN count(n) AS c",
            "SET x.y = 1",
        ];
        let connector = ScriptedConnector::new();
        connector.fail(statements[2], "Invalid input 'RETURN': expected ')'");
        let mut session = session(&connector).await;

        let batch = run_batch(&mut session, statements.iter().copied()).await;

        assert_eq!(batch.total_queries, statements.len());
        assert_eq!(batch.failed_queries, 1);
        assert_eq!(batch.successful_queries, statements.len() - 1);
        for (i, item) in batch.results.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.statement, statements[i]);
            let expected = if i == 2 { "error" } else { "success" };
            assert_eq!(item.status(), expected, "item {i}");
        }
        assert_eq!(
            batch.results[2].outcome,
            ItemOutcome::Failed("Invalid input 'RETURN': expected ')'".to_string())
        );
        // Everything after the failure still ran.
        assert_eq!(connector.executed().len(), statements.len());
    }

    #[tokio::test]
    async fn test_unclassified_statement_runs_as_write() {
        let connector = ScriptedConnector::new();
        connector.write(
            "UNWIND [1, 2] AS x CREATE (:N {v: x})",
            WriteSummary {
                nodes_created: 2,
                properties_set: 2,
                ..Default::default()
            },
        );
        let mut session = session(&connector).await;

        let batch = run_batch(&mut session, ["UNWIND [1, 2] AS x CREATE (:N {v: x})"]).await;
        assert_eq!(batch.results[0].outcome, ItemOutcome::Affected(4));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let connector = ScriptedConnector::new();
        let mut session = session(&connector).await;

        let batch = run_batch(&mut session, Vec::<String>::new()).await;
        assert_eq!(batch.total_queries, 0);
        assert_eq!(batch.successful_queries, 0);
        assert_eq!(batch.failed_queries, 0);
        assert!(batch.results.is_empty());
    }
}
