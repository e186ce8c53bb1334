//! MCP server implementation for Sundial.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarService, GoogleCalendar};
use crate::config::Config;

/// Sundial MCP server handler.
#[derive(Clone)]
pub struct SundialServer {
    service: Arc<CalendarService<GoogleCalendar>>,
    tool_router: ToolRouter<Self>,
}

impl SundialServer {
    /// Create a new server from configuration, connecting the calendar
    /// backend.
    pub async fn new(config: Config) -> crate::error::Result<Self> {
        let service = CalendarService::from_config(&config).await?;
        Ok(Self {
            service: Arc::new(service),
            tool_router: Self::tool_router(),
        })
    }
}

// Parameters for list_events_for_day tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListEventsParams {
    /// Date in YYYY-MM-DD format
    pub date: String,
}

// Parameters for is_free_at tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct IsFreeParams {
    /// Datetime in ISO format (e.g. '2025-06-12T15:00:00+02:00')
    pub datetime_str: String,
}

// Parameters for find_next_free_slot tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FindSlotParams {
    /// Earliest acceptable start, in ISO format
    pub after_datetime: String,
    /// Required slot length in minutes
    pub duration_minutes: i64,
}

// Parameters for schedule_event tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScheduleParams {
    /// Event title
    pub summary: String,
    /// Event start, in ISO format
    pub start_datetime: String,
    /// Event end, in ISO format
    pub end_datetime: String,
}

// Parameters for update_event tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UpdateParams {
    /// ID of the event to update
    pub event_id: String,
    /// New event title, if it should change
    #[serde(default)]
    pub new_summary: Option<String>,
    /// New start in ISO format, if it should change
    #[serde(default)]
    pub new_start: Option<String>,
    /// New end in ISO format, if it should change
    #[serde(default)]
    pub new_end: Option<String>,
}

// Parameters for cancel_event tool
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CancelParams {
    /// ID of the event to cancel
    pub event_id: String,
}

#[tool_router]
impl SundialServer {
    #[tool(description = "List all events on a given day. The date must be in YYYY-MM-DD format.")]
    async fn list_events_for_day(
        &self,
        Parameters(params): Parameters<ListEventsParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.service.list_events_for_day(&params.date).await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }

    #[tool(
        description = "Check whether the calendar is free at a specific datetime (ISO format). Returns 'true' or 'false'; failures count as busy."
    )]
    async fn is_free_at(
        &self,
        Parameters(params): Parameters<IsFreeParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.service.is_free_at(&params.datetime_str).await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }

    #[tool(
        description = "Find the first free slot of the given duration starting at or after a datetime, searching until the end of that day."
    )]
    async fn find_next_free_slot(
        &self,
        Parameters(params): Parameters<FindSlotParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .service
            .find_next_free_slot(&params.after_datetime, params.duration_minutes)
            .await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }

    #[tool(
        description = "Create a calendar event with the given summary, start, and end datetime (ISO format)."
    )]
    async fn schedule_event(
        &self,
        Parameters(params): Parameters<ScheduleParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .service
            .schedule_event(&params.summary, &params.start_datetime, &params.end_datetime)
            .await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }

    #[tool(
        description = "Update an existing event by ID. Only the fields provided are changed; the rest keep their current values."
    )]
    async fn update_event(
        &self,
        Parameters(params): Parameters<UpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .service
            .update_event(
                &params.event_id,
                params.new_summary,
                params.new_start,
                params.new_end,
            )
            .await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }

    #[tool(description = "Cancel (delete) an event by ID.")]
    async fn cancel_event(
        &self,
        Parameters(params): Parameters<CancelParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.service.cancel_event(&params.event_id).await;
        Ok(CallToolResult::success(vec![Content::text(
            outcome.render(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for SundialServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Sundial is a calendar assistant MCP server backed by Google Calendar. \
                 Use 'list_events_for_day' to see a day's schedule, 'is_free_at' to check \
                 a specific time, 'find_next_free_slot' to look for openings, and \
                 'schedule_event', 'update_event', 'cancel_event' to make changes. \
                 Datetimes are ISO formatted, dates are YYYY-MM-DD."
                    .to_string(),
            ),
        }
    }
}
