//! Scripted in-memory backend for exercising the gateway without a database.
//!
//! Statements are matched by exact text. Unscripted statements succeed with no
//! rows and zero counters, except the liveness probe which returns one row.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use graphgate_core::{ConnectionConfig, Record, WriteSummary};

use crate::client::GraphError;
use crate::session::{Connector, GraphSession, LIVENESS_PROBE};

/// Build a record from `(field, value)` pairs, keeping their order.
pub fn record(fields: &[(&str, serde_json::Value)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[derive(Debug, Clone)]
enum Reply {
    Rows(Vec<Record>),
    Write(WriteSummary),
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    connect_failure: Option<String>,
    executed: Vec<String>,
    opened: usize,
    closed: usize,
}

/// A connector whose sessions answer from a shared script.
///
/// Clones share the script and the open/close counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread must not hide the counters from the assertions.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer `statement` with these rows.
    pub fn rows(&self, statement: &str, rows: Vec<Record>) {
        self.lock()
            .replies
            .insert(statement.to_string(), Reply::Rows(rows));
    }

    /// Answer `statement` with these update counters.
    pub fn write(&self, statement: &str, summary: WriteSummary) {
        self.lock()
            .replies
            .insert(statement.to_string(), Reply::Write(summary));
    }

    /// Fail `statement` with this database message.
    pub fn fail(&self, statement: &str, message: &str) {
        self.lock()
            .replies
            .insert(statement.to_string(), Reply::Fail(message.to_string()));
    }

    /// Hold `statement` for this long before answering it.
    pub fn delay(&self, statement: &str, by: Duration) {
        self.lock().delays.insert(statement.to_string(), by);
    }

    /// Make every `open` fail with this message.
    pub fn fail_connect(&self, message: &str) {
        self.lock().connect_failure = Some(message.to_string());
    }

    /// Statements run so far, across all sessions, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    pub fn opened(&self) -> usize {
        self.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    async fn answer(&self, statement: &str) -> Option<Reply> {
        let delay = {
            let mut script = self.lock();
            script.executed.push(statement.to_string());
            script.delays.get(statement).copied()
        };
        if let Some(by) = delay {
            tokio::time::sleep(by).await;
        }
        self.lock().replies.get(statement).cloned()
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn open(&self, _config: &ConnectionConfig) -> Result<ScriptedSession, GraphError> {
        let mut script = self.lock();
        if let Some(message) = &script.connect_failure {
            return Err(GraphError::Connection(message.clone()));
        }
        script.opened += 1;
        drop(script);

        Ok(ScriptedSession {
            connector: self.clone(),
            open: true,
        })
    }
}

/// A session handed out by [`ScriptedConnector`].
#[derive(Debug)]
pub struct ScriptedSession {
    connector: ScriptedConnector,
    open: bool,
}

impl ScriptedSession {
    fn ensure_open(&self) -> Result<(), GraphError> {
        if self.open {
            Ok(())
        } else {
            Err(GraphError::Connection("session already closed".to_string()))
        }
    }
}

impl GraphSession for ScriptedSession {
    async fn fetch(&mut self, statement: &str) -> Result<Vec<Record>, GraphError> {
        self.ensure_open()?;
        match self.connector.answer(statement).await {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Write(_)) => Ok(Vec::new()),
            Some(Reply::Fail(message)) => Err(GraphError::Statement(message)),
            None if statement == LIVENESS_PROBE => {
                Ok(vec![record(&[("1", serde_json::json!(1))])])
            }
            None => Ok(Vec::new()),
        }
    }

    async fn apply(&mut self, statement: &str) -> Result<WriteSummary, GraphError> {
        self.ensure_open()?;
        match self.connector.answer(statement).await {
            Some(Reply::Write(summary)) => Ok(summary),
            Some(Reply::Fail(message)) => Err(GraphError::Statement(message)),
            Some(Reply::Rows(_)) | None => Ok(WriteSummary::default()),
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.connector.lock().closed += 1;
        }
    }
}
