//! Git repositories, repository imports and Git service endpoints.

use devops_model::{ImportRequest, Repo, ServiceEndpointRequest, ValueList};
use serde_json::Value;
use tracing::{info, instrument};

use crate::connection::{api_version, required_string_field, Connection};
use crate::error::DevOpsResult;
use crate::transport::Method;

/// Repository operations, addressed per project.
#[derive(Clone)]
pub struct ReposApi {
    connection: Connection,
    endpoint_prefix: String,
}

impl ReposApi {
    /// Endpoints created through this API are named `{endpoint_prefix}-Git-{uuid}`.
    pub fn new(connection: Connection, endpoint_prefix: impl Into<String>) -> Self {
        Self {
            connection,
            endpoint_prefix: endpoint_prefix.into(),
        }
    }

    /// List the Git repositories of a project.
    #[instrument(skip(self))]
    pub async fn list_repos(&self, project_id: &str) -> DevOpsResult<Vec<Repo>> {
        let url = self
            .connection
            .collection()?
            .segments(&[project_id, "_apis", "git", "repositories"])
            .api_version(api_version::CORE);

        let list: ValueList<Repo> = self.connection.get(&url).await?;
        Ok(list.into_items())
    }

    /// Import an external Git repository into `repo_id`. Returns the import request id.
    ///
    /// The service endpoint is deleted by the platform once the import is done.
    #[instrument(skip(self, source_url))]
    pub async fn import_repo(
        &self,
        project_id: &str,
        repo_id: &str,
        source_url: &str,
        service_endpoint_id: &str,
    ) -> DevOpsResult<String> {
        let url = self
            .connection
            .collection()?
            .segments(&[project_id, "_apis", "git", "repositories", repo_id, "importRequests"])
            .api_version(api_version::IMPORT);

        let request = ImportRequest::git(source_url, service_endpoint_id);
        let response: Value = self.connection.send_json(Method::Post, &url, &request).await?;
        let id = required_string_field(&response, "importRequestId")?;
        info!(import_request = %id, "Repository import queued");
        Ok(id)
    }

    /// Create a username/password Git service endpoint. Returns the endpoint id.
    #[instrument(skip(self, source_url, username, password))]
    pub async fn create_git_endpoint(
        &self,
        project_id: &str,
        source_url: &str,
        username: &str,
        password: &str,
    ) -> DevOpsResult<String> {
        let url = self
            .connection
            .collection()?
            .segments(&[project_id, "_apis", "distributedtask", "serviceendpoints"])
            .api_version(api_version::ENDPOINTS);

        let request = ServiceEndpointRequest::git(&self.endpoint_prefix, source_url, username, password);
        let response: Value = self.connection.send_json(Method::Post, &url, &request).await?;
        let id = required_string_field(&response, "id")?;
        info!(endpoint = %id, name = %request.name, "Service endpoint created");
        Ok(id)
    }
}
