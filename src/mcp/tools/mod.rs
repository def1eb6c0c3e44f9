//! MCP tool handlers.

pub mod create_project;
pub mod delete_project;
pub mod get_organization;
pub mod get_project;
pub mod list_organizations;
pub mod list_projects;
