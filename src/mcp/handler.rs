//! MCP server handler, shared application state, and tool router.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::{
    tool::{ToolCallContext, ToolRoute, ToolRouter},
    ServerHandler,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use tracing::info_span;

use crate::config::RelayConfig;
use crate::platform::client::PlatformClient;

/// Tools that mutate platform state, unavailable in read-only mode.
const MUTATING_TOOLS: &[&str] = &["create_project", "delete_project"];

/// Shared application state accessible by all MCP tool handlers.
pub struct AppState {
    /// Relay configuration.
    pub config: Arc<RelayConfig>,
    /// Client for the upstream platform management API.
    pub platform: PlatformClient,
}

/// MCP server implementation that exposes the platform tools.
///
/// One instance is attached per session; all instances share the same
/// [`AppState`].
pub struct RelayServer {
    state: Arc<AppState>,
}

impl RelayServer {
    /// Create a new MCP server bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    fn tool_router(read_only: bool) -> ToolRouter<Self> {
        let mut router = ToolRouter::new();

        for tool in Self::all_tools(read_only) {
            let name = tool.name.to_string();
            match name.as_str() {
                "list_projects" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::list_projects::handle(context))
                    }));
                }
                "get_project" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::get_project::handle(context))
                    }));
                }
                "create_project" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::create_project::handle(context))
                    }));
                }
                "delete_project" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::delete_project::handle(context))
                    }));
                }
                "list_organizations" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::list_organizations::handle(context))
                    }));
                }
                "get_organization" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::get_organization::handle(context))
                    }));
                }
                _ => {
                    router.add_route(ToolRoute::new_dyn(tool, |_context| {
                        Box::pin(async {
                            Err(rmcp::ErrorData::internal_error(
                                "tool not implemented",
                                None,
                            ))
                        })
                    }));
                }
            }
        }

        router
    }

    /// Convert a `serde_json::Value::Object` into the `Arc<Map>` expected by `Tool`.
    fn schema(value: serde_json::Value) -> Arc<serde_json::Map<String, serde_json::Value>> {
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::default()),
        }
    }

    /// Full tool table; mutating tools are omitted in read-only mode.
    #[allow(clippy::too_many_lines)] // Tool definitions are intentionally verbose for clarity.
    fn all_tools(read_only: bool) -> Vec<Tool> {
        let mut tools = vec![
            Tool {
                name: "list_projects".into(),
                description: Some(
                    "List all projects the access token can reach, including their \
                     status and region."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "get_project".into(),
                description: Some("Get details of a single project by its identifier.".into()),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "project_id": { "type": "string" }
                    },
                    "required": ["project_id"]
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "list_organizations".into(),
                description: Some(
                    "List the organizations the access token belongs to.".into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "get_organization".into(),
                description: Some(
                    "Get details of a single organization by its identifier.".into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "organization_id": { "type": "string" }
                    },
                    "required": ["organization_id"]
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            },
        ];

        if !read_only {
            tools.push(Tool {
                name: "create_project".into(),
                description: Some(
                    "Create a new project inside an organization. Provisioning \
                     continues asynchronously after the call returns."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "organization_id": { "type": "string" },
                        "region": { "type": "string" }
                    },
                    "required": ["name", "organization_id"]
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            });
            tools.push(Tool {
                name: "delete_project".into(),
                description: Some(
                    "Delete a project and all of its resources. Irreversible.".into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "project_id": { "type": "string" }
                    },
                    "required": ["project_id"]
                })),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
                meta: None,
            });
        }

        tools
    }
}

impl ServerHandler for RelayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-relay".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::default()
            },
            instructions: Some(
                "MCP server for the platform management API. List and inspect \
                 projects and organizations; create and delete projects unless \
                 the server runs in read-only mode."
                    .into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        let read_only = self.state.config.read_only;
        let router = Self::tool_router(read_only);
        let _span = info_span!("call_tool", tool = %request.name).entered();

        async move {
            if read_only && MUTATING_TOOLS.contains(&request.name.as_ref()) {
                return Err(rmcp::ErrorData::invalid_request(
                    "server is in read-only mode",
                    None,
                ));
            }

            router
                .call(ToolCallContext::new(self, request, context))
                .await
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        let tools = Self::all_tools(self.state.config.read_only);

        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }
}
