//! Session lifecycle: the driver seam and the per-operation connection manager.
//!
//! Every gateway operation opens exactly one session through
//! [`ConnectionManager::acquire`] and the returned [`SessionGuard`] closes it
//! exactly once, whether the operation returns normally, fails, panics, or is
//! dropped mid-flight.

use std::future::Future;
use std::ops::{Deref, DerefMut};

use graphgate_core::{ConnectionConfig, GatewayError, Record, WriteSummary};

use crate::client::GraphError;

/// Statement used to verify a freshly opened session.
pub const LIVENESS_PROBE: &str = "RETURN 1";

/// A live connection owned by a single operation.
pub trait GraphSession: Send {
    /// Run a statement verbatim and collect every row.
    fn fetch(&mut self, statement: &str)
        -> impl Future<Output = Result<Vec<Record>, GraphError>> + Send;

    /// Run a statement verbatim, discard its rows, and report update counters.
    fn apply(&mut self, statement: &str)
        -> impl Future<Output = Result<WriteSummary, GraphError>> + Send;

    /// Close the underlying connection. Called once by [`SessionGuard`].
    fn close(&mut self);
}

/// Opens sessions against a database endpoint.
pub trait Connector: Send + Sync {
    type Session: GraphSession;

    fn open(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<Self::Session, GraphError>> + Send;
}

/// Produces one verified session per operation from an immutable config.
pub struct ConnectionManager<C> {
    config: ConnectionConfig,
    connector: C,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(config: ConnectionConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Open a session and run the liveness probe on it.
    ///
    /// A missing endpoint is a configuration error and nothing is contacted.
    /// Connect, authentication, probe, and timeout failures are all reported as
    /// connection errors naming the endpoint.
    pub async fn acquire(&self) -> Result<SessionGuard<C::Session>, GatewayError> {
        let uri = self.config.endpoint()?.to_string();

        // The guard owns the session from the moment it is opened, so a failed
        // probe or an expired timeout (which drops this future) still closes it.
        let attempt = async {
            let session = self.connector.open(&self.config).await?;
            let mut guard = SessionGuard::new(session, uri.clone());
            guard.fetch(LIVENESS_PROBE).await?;
            Ok::<_, GraphError>(guard)
        };

        let reason = match tokio::time::timeout(self.config.connect_timeout(), attempt).await {
            Ok(Ok(guard)) => {
                tracing::debug!(uri = %uri, "Session opened");
                return Ok(guard);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "no response within {}s",
                self.config.connect_timeout_secs
            ),
        };

        tracing::error!(uri = %uri, error = %reason, "Database connection failed");
        tracing::warn!(
            "Check that {prefix}_URI/{prefix}_USERNAME/{prefix}_PASSWORD are set, that the host \
             name is reachable from this process (inside a container use host.docker.internal \
             rather than localhost), and that the database is running",
            prefix = graphgate_core::config::ENV_PREFIX
        );
        Err(GatewayError::Connection { uri, reason })
    }
}

/// Owns a session for the duration of one operation and closes it exactly once.
pub struct SessionGuard<S: GraphSession> {
    session: S,
    uri: String,
    released: bool,
}

impl<S: GraphSession> SessionGuard<S> {
    fn new(session: S, uri: String) -> Self {
        Self {
            session,
            uri,
            released: false,
        }
    }

    /// Close the session now. Dropping the guard has the same effect.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.session.close();
            tracing::debug!(uri = %self.uri, "Session released");
        }
    }
}

impl<S: GraphSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: GraphSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: GraphSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.close_once();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::ScriptedConnector;

    fn manager(connector: &ScriptedConnector) -> ConnectionManager<ScriptedConnector> {
        ConnectionManager::new(
            ConnectionConfig::new("bolt://localhost:7687"),
            connector.clone(),
        )
    }

    #[tokio::test]
    async fn test_empty_uri_is_configuration_error() {
        let connector = ScriptedConnector::new();
        let manager = ConnectionManager::new(ConnectionConfig::new(""), connector.clone());

        let err = manager.acquire().await.err().unwrap();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert_eq!(connector.opened(), 0);
        assert!(connector.executed().is_empty());
    }

    #[tokio::test]
    async fn test_acquire_runs_probe_and_release_closes_once() {
        let connector = ScriptedConnector::new();
        let manager = manager(&connector);

        let session = manager.acquire().await.unwrap();
        assert_eq!(connector.executed(), vec![LIVENESS_PROBE.to_string()]);
        assert_eq!(connector.closed(), 0);

        session.release();
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_dropped_guard_closes_session() {
        let connector = ScriptedConnector::new();
        let manager = manager(&connector);

        {
            let _session = manager.acquire().await.unwrap();
        }
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_is_connection_error_with_uri() {
        let connector = ScriptedConnector::new();
        connector.fail_connect("connection refused");
        let manager = manager(&connector);

        match manager.acquire().await.err().unwrap() {
            GatewayError::Connection { uri, reason } => {
                assert_eq!(uri, "bolt://localhost:7687");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(connector.opened(), 0);
    }

    #[tokio::test]
    async fn test_probe_timeout_closes_session() {
        let connector = ScriptedConnector::new();
        connector.delay(LIVENESS_PROBE, Duration::from_secs(5));
        let mut config = ConnectionConfig::new("bolt://localhost:7687");
        config.connect_timeout_secs = 1;
        let manager = ConnectionManager::new(config, connector.clone());

        match manager.acquire().await.err().unwrap() {
            GatewayError::Connection { reason, .. } => {
                assert!(reason.contains("no response within 1s"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_closes_session() {
        let connector = ScriptedConnector::new();
        connector.fail(LIVENESS_PROBE, "authentication failure");
        let manager = manager(&connector);

        let err = manager.acquire().await.err().unwrap();
        assert!(matches!(err, GatewayError::Connection { .. }));
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.closed(), 1);
    }
}
