//! HTTP client for the platform management REST API.
//!
//! Thin wrapper over `reqwest` with bearer-token authentication. Tool
//! handlers call it; transport correctness never depends on it.

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// A project as reported by the platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Human-readable project name.
    pub name: String,
    /// Owning organization identifier.
    pub organization_id: String,
    /// Deployment region, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Provisioning status, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// An organization as reported by the platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: String,
    /// Human-readable organization name.
    pub name: String,
}

/// Request body for project creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    /// Name for the new project.
    pub name: String,
    /// Organization the project is created in.
    pub organization_id: String,
    /// Optional deployment region; the platform picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// HTTP client for the platform management API.
#[derive(Clone)]
pub struct PlatformClient {
    base_url: String,
    access_token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The access token never appears in logs or debug output.
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PlatformClient {
    /// Create a new client for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            base_url,
            access_token,
            http: reqwest::Client::new(),
        }
    }

    /// List all projects visible to the access token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request or decode failure.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = format!("{}/v1/projects", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        decode(check(resp).await?).await
    }

    /// Get a single project.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request or decode failure.
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let url = format!("{}/v1/projects/{project_id}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        decode(check(resp).await?).await
    }

    /// Create a new project.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request or decode failure.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project> {
        let url = format!("{}/v1/projects", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        decode(check(resp).await?).await
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request failure or a non-success
    /// status.
    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        let url = format!("{}/v1/projects/{project_id}", self.base_url);
        let resp = self
            .http
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        check(resp).await?;
        Ok(())
    }

    /// List the organizations the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request or decode failure.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let url = format!("{}/v1/organizations", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        decode(check(resp).await?).await
    }

    /// Get a single organization.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Platform` on request or decode failure.
    pub async fn get_organization(&self, organization_id: &str) -> Result<Organization> {
        let url = format!("{}/v1/organizations/{organization_id}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| AppError::Platform(format!("request failed: {err}")))?;
        decode(check(resp).await?).await
    }
}

/// Map non-success statuses to `AppError::Platform` with the body text.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::Platform(format!(
        "platform API returned {status}: {body}"
    )))
}

/// Decode a JSON response body.
async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    resp.json()
        .await
        .map_err(|err| AppError::Platform(format!("failed to decode response: {err}")))
}
