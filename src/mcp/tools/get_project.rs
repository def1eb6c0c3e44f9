//! `get_project` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::RelayServer;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct GetProjectInput {
    /// Identifier of the project to fetch.
    project_id: String,
}

/// Handle the `get_project` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` on validation or platform API failures.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let args: serde_json::Map<String, serde_json::Value> = context.arguments.unwrap_or_default();

    let input: GetProjectInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(format!("invalid get_project parameters: {err}"), None)
        })?;

    let span = info_span!("get_project", project_id = %input.project_id);

    async move {
        let project = state
            .platform
            .get_project(&input.project_id)
            .await
            .map_err(|err| {
                rmcp::ErrorData::internal_error(format!("failed to get project: {err}"), None)
            })?;

        Ok(CallToolResult::success(vec![rmcp::model::Content::json(
            project,
        )
        .map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to serialize project: {err}"), None)
        })?]))
    }
    .instrument(span)
    .await
}
