//! `list_projects` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info, info_span, Instrument};

use crate::mcp::handler::RelayServer;

/// Handle the `list_projects` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the platform API call fails.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let span = info_span!("list_projects");

    async move {
        let projects = state.platform.list_projects().await.map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to list projects: {err}"), None)
        })?;

        info!(count = projects.len(), "listed projects");

        Ok(CallToolResult::success(vec![rmcp::model::Content::json(
            serde_json::json!({ "projects": projects }),
        )
        .map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to serialize projects: {err}"), None)
        })?]))
    }
    .instrument(span)
    .await
}
