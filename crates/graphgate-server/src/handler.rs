//! MCP server handler: routes `tools/list` and `tools/call` through the
//! [`ToolRegistry`] into the gateway.
//!
//! Gateway failures come back as tool results flagged `isError`, so the
//! calling agent sees the database's message. Unknown tools and malformed
//! arguments are protocol errors.

use std::future::Future;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;

use graphgate_graph::{Connector, Gateway};

use crate::error::ToolError;
use crate::registry::ToolRegistry;

const INSTRUCTIONS: &str = "Cypher access to a Memgraph or Neo4j database. \
Use get_schema_info to discover labels, relationship types, and property keys, \
execute_query for reads, modify_graph for statements starting with CREATE, MERGE, \
DELETE, SET, or REMOVE, and execute_multiple_queries to run several statements in order.";

/// The tool server: a gateway plus the registry that routes calls into it.
pub struct GraphGateServer<C: Connector> {
    gateway: Gateway<C>,
    registry: ToolRegistry,
}

impl<C: Connector> GraphGateServer<C> {
    pub fn new(gateway: Gateway<C>, registry: ToolRegistry) -> Self {
        Self { gateway, registry }
    }

    /// Tool definitions in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .tools()
            .iter()
            .map(|spec| {
                let schema: JsonObject = spec.input_schema.as_object().cloned().unwrap_or_default();
                Tool::new(spec.name, spec.description, schema)
            })
            .collect()
    }

    /// Run one tool call and shape the outcome for the protocol.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(arguments.unwrap_or_default());

        match self.registry.call(&self.gateway, name, arguments).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(ToolError::Gateway(e)) => {
                tracing::warn!(tool = %name, kind = e.kind(), error = %e, "Tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e @ ToolError::UnknownTool(_)) => {
                Err(McpError::new(ErrorCode::METHOD_NOT_FOUND, e.to_string(), None))
            }
            Err(e @ ToolError::InvalidArguments { .. }) => {
                Err(McpError::invalid_params(e.to_string(), None))
            }
            Err(e @ ToolError::Serialization(_)) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}

impl<C: Connector + 'static> ServerHandler for GraphGateServer<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "graphgate".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.tools();
        async move { Ok(ListToolsResult::with_all_items(tools)) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.dispatch(&request.name, request.arguments).await }
    }
}
