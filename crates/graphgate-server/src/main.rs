//! CLI entry point for the graphgate tool server.
//!
//! Speaks MCP on stdin/stdout; logs go to stderr.

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use graphgate_core::ConnectionConfig;
use graphgate_graph::Gateway;
use graphgate_server::handler::GraphGateServer;
use graphgate_server::registry::ToolRegistry;

#[derive(Parser)]
#[command(name = "graphgate")]
#[command(about = "Cypher tools for Memgraph/Neo4j over MCP on stdio")]
struct Cli {
    /// Config file prefix (default: graphgate).
    #[arg(short, long, default_value = "graphgate")]
    config: String,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Verify the database connection, print graph statistics, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let connection = ConnectionConfig::load(&cli.config)?;
    connection.log_summary();

    let gateway = Gateway::bolt(connection);

    if cli.check {
        let stats = gateway.get_database_stats().await?;
        tracing::info!(uri = %gateway.config().uri, "Database connection verified");
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let registry = ToolRegistry::standard();
    tracing::info!(tools = registry.tools().len(), "Starting graphgate tool server on stdio");

    let service = GraphGateServer::new(gateway, registry).serve(stdio()).await?;
    let reason = service.waiting().await?;
    tracing::info!(?reason, "Tool server stopped");
    Ok(())
}
