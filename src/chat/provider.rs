//! Tool provider connection.
//!
//! The chat front-end never calls the calendar operations in-process. It
//! spawns its own binary in `serve` mode as a child and talks MCP over the
//! child's stdio, the same way any other MCP client would.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, RawContent},
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::chat::engine::ToolSpec;

/// Source of callable tools for a chat session.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// The advertised tool catalog.
    async fn tools(&self) -> Result<Vec<ToolSpec>>;

    /// Invoke one tool and return its text output.
    async fn call(&self, name: &str, arguments: Value) -> Result<String>;
}

/// MCP client over a spawned `sundial serve` child process.
///
/// The child is killed when this provider is dropped.
pub struct McpToolProvider {
    client: RunningService<RoleClient, ()>,
}

impl McpToolProvider {
    /// Spawn the tool server and complete the MCP handshake.
    pub async fn spawn(config_path: Option<&str>) -> Result<Self> {
        let exe = std::env::current_exe()?;
        info!("Spawning tool server: {} serve", exe.display());

        let transport = TokioChildProcess::new(Command::new(exe).configure(|cmd| {
            cmd.arg("serve");
            if let Some(path) = config_path {
                cmd.arg("--config").arg(path);
            }
        }))?;
        let client = ().serve(transport).await?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    async fn tools(&self) -> Result<Vec<ToolSpec>> {
        let tools = self.client.list_all_tools().await?;
        debug!("Tool server advertised {} tools", tools.len());

        Ok(tools
            .into_iter()
            .map(|tool| ToolSpec {
                name: tool.name.to_string(),
                description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
                parameters: Value::Object(tool.input_schema.as_ref().clone()),
            })
            .collect())
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<String> {
        let result = self
            .client
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments.as_object().cloned().unwrap_or_default()),
                task: None,
            })
            .await?;

        // Content is Annotated<RawContent>, the text lives in .raw
        let text = result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(text_content) => Some(text_content.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(anyhow!("Empty response from tool server"));
        }

        Ok(text)
    }
}
