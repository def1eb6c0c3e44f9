//! `get_organization` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::RelayServer;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct GetOrganizationInput {
    /// Identifier of the organization to fetch.
    organization_id: String,
}

/// Handle the `get_organization` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` on validation or platform API failures.
pub async fn handle(
    context: ToolCallContext<'_, RelayServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let args: serde_json::Map<String, serde_json::Value> = context.arguments.unwrap_or_default();

    let input: GetOrganizationInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid get_organization parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("get_organization", organization_id = %input.organization_id);

    async move {
        let organization = state
            .platform
            .get_organization(&input.organization_id)
            .await
            .map_err(|err| {
                rmcp::ErrorData::internal_error(format!("failed to get organization: {err}"), None)
            })?;

        Ok(CallToolResult::success(vec![rmcp::model::Content::json(
            organization,
        )
        .map_err(|err| {
            rmcp::ErrorData::internal_error(
                format!("failed to serialize organization: {err}"),
                None,
            )
        })?]))
    }
    .instrument(span)
    .await
}
