//! `create_project` MCP tool handler.
//!
//! Unavailable in read-only mode; the router omits it from the tool list
//! and the handler layer rejects direct calls.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info, info_span, Instrument};

use crate::mcp::handler::RelayServer;
use crate::platform::client::CreateProjectRequest;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct CreateProjectInput {
    /// Name for the new project.
    name: String,
    /// Organization the project is created in.
    organization_id: String,
    /// Optional deployment region.
    region: Option<String>,
}

/// Handle the `create_project` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` on validation or platform API failures.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let args: serde_json::Map<String, serde_json::Value> = context.arguments.unwrap_or_default();

    let input: CreateProjectInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid create_project parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!(
        "create_project",
        name = %input.name,
        organization_id = %input.organization_id,
    );

    async move {
        let request = CreateProjectRequest {
            name: input.name,
            organization_id: input.organization_id,
            region: input.region,
        };

        let project = state
            .platform
            .create_project(&request)
            .await
            .map_err(|err| {
                rmcp::ErrorData::internal_error(format!("failed to create project: {err}"), None)
            })?;

        info!(project_id = %project.id, "project created");

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
