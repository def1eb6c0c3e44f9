//! `list_organizations` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info, info_span, Instrument};

use crate::mcp::handler::RelayServer;

/// Handle the `list_organizations` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the platform API call fails.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let span = info_span!("list_organizations");

    async move {
        let organizations = state.platform.list_organizations().await.map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to list organizations: {err}"), None)
        })?;

        info!(count = organizations.len(), "listed organizations");

        Ok(CallToolResult::success(vec![rmcp::model::Content::json(
            serde_json::json!({ "organizations": organizations }),
        )
        .map_err(|err| {
            rmcp::ErrorData::internal_error(
                format!("failed to serialize organizations: {err}"),
                None,
            )
        })?]))
    }
    .instrument(span)
    .await
}
