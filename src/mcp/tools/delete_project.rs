//! `delete_project` MCP tool handler.
//!
//! Unavailable in read-only mode.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info, info_span, Instrument};

use crate::mcp::handler::RelayServer;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct DeleteProjectInput {
    /// Identifier of the project to delete.
    project_id: String,
}

/// Handle the `delete_project` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` on validation or platform API failures.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let args: serde_json::Map<String, serde_json::Value> = context.arguments.unwrap_or_default();

    let input: DeleteProjectInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid delete_project parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("delete_project", project_id = %input.project_id);

    async move {
        state
            .platform
            .delete_project(&input.project_id)
            .await
            .map_err(|err| {
                rmcp::ErrorData::internal_error(format!("failed to delete project: {err}"), None)
            })?;

        info!(project_id = %input.project_id, "project deleted");

        Ok(CallToolResult::success(vec![rmcp::model::Content::json(
            serde_json::json!({ "deleted": true, "project_id": input.project_id }),
        )
        .map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to serialize response: {err}"), None)
        })?]))
    }
    .instrument(span)
    .await
}
