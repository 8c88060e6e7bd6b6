//! Tool registry: the dispatch table from tool name to gateway operation.
//!
//! Built once at startup and handed to the MCP handler. Each entry carries the
//! description and JSON input schema advertised to the calling agent.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use graphgate_graph::{Connector, Gateway};

use crate::error::ToolError;

/// The gateway operation a tool runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ExecuteQuery,
    GetSchemaInfo,
    GetDatabaseStats,
    ModifyGraph,
    ExecuteMultipleQueries,
}

/// One advertised tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
    pub input_schema: Value,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct BatchArgs {
    queries: Vec<String>,
}

/// Name → tool dispatch table.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five gateway tools, plus `execute_cypher_query` as a hidden alias
    /// of `execute_query`.
    pub fn standard() -> Self {
        let query_schema = json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Cypher statement to run"
                }
            },
            "required": ["query"]
        });
        let no_args = json!({ "type": "object", "properties": {} });

        let mut registry = Self::new();
        registry.register(ToolSpec {
            name: "execute_query",
            description: "Run a Cypher statement against the graph database and return its rows.",
            kind: ToolKind::ExecuteQuery,
            input_schema: query_schema.clone(),
        });
        registry.register(ToolSpec {
            name: "get_schema_info",
            description: "List the node labels, relationship types, and property names in the graph.",
            kind: ToolKind::GetSchemaInfo,
            input_schema: no_args.clone(),
        });
        registry.register(ToolSpec {
            name: "get_database_stats",
            description: "Count nodes and relationships, overall and by label / relationship type.",
            kind: ToolKind::GetDatabaseStats,
            input_schema: no_args,
        });
        registry.register(ToolSpec {
            name: "modify_graph",
            description: "Modify the graph with a statement starting with CREATE, MERGE, DELETE, SET, or REMOVE.",
            kind: ToolKind::ModifyGraph,
            input_schema: query_schema,
        });
        registry.register(ToolSpec {
            name: "execute_multiple_queries",
            description: "Run several Cypher statements in order. A failing statement is reported on its own entry and does not stop the rest.",
            kind: ToolKind::ExecuteMultipleQueries,
            input_schema: json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Cypher statements, run in this order"
                    }
                },
                "required": ["queries"]
            }),
        });
        registry.alias("execute_cypher_query", "execute_query");
        registry
    }

    /// Add a tool. A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, spec: ToolSpec) {
        let name = spec.name;
        match self.by_name.get(name) {
            Some(&idx) => self.tools[idx] = spec,
            None => {
                self.tools.push(spec);
                self.by_name.insert(name, self.tools.len() - 1);
            }
        }
    }

    /// Accept `alias` as another name for an already registered tool.
    /// Aliases are callable but not listed.
    pub fn alias(&mut self, alias: &'static str, target: &str) {
        if let Some(&idx) = self.by_name.get(target) {
            self.by_name.insert(alias, idx);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.by_name.get(name).map(|&idx| &self.tools[idx])
    }

    /// Tools in registration order.
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Run the tool registered under `name` with JSON `arguments`.
    pub async fn call<C: Connector>(
        &self,
        gateway: &Gateway<C>,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let spec = self
            .lookup(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tracing::info!(tool = spec.name, "Tool call");
        let started = std::time::Instant::now();

        let result = match spec.kind {
            ToolKind::ExecuteQuery => {
                let args: QueryArgs = parse_args(spec.name, arguments)?;
                serde_json::to_value(gateway.execute_query(&args.query).await?)?
            }
            ToolKind::GetSchemaInfo => serde_json::to_value(gateway.get_schema_info().await?)?,
            ToolKind::GetDatabaseStats => {
                serde_json::to_value(gateway.get_database_stats().await?)?
            }
            ToolKind::ModifyGraph => {
                let args: QueryArgs = parse_args(spec.name, arguments)?;
                serde_json::to_value(gateway.modify_graph(&args.query).await?)?
            }
            ToolKind::ExecuteMultipleQueries => {
                let args: BatchArgs = parse_args(spec.name, arguments)?;
                serde_json::to_value(gateway.execute_multiple_queries(args.queries).await?)?
            }
        };

        tracing::debug!(
            tool = spec.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );
        Ok(result)
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
