//! Transport layer for MCP server.

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use crate::config::Config;
use crate::mcp::SundialServer;

/// Run the MCP server with stdio transport.
pub async fn run_stdio(server: SundialServer) -> Result<()> {
    info!("Starting Sundial MCP server with stdio transport");

    let service = server.serve(stdio()).await?;

    info!("Sundial MCP server running...");
    service.waiting().await?;

    info!("Sundial MCP server shutting down");
    Ok(())
}

/// Build a server from configuration and serve it over stdio.
pub async fn run_server(config: Config) -> Result<()> {
    let server = SundialServer::new(config).await?;
    run_stdio(server).await
}
