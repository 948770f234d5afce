//! Project listing, creation and deletion.

use devops_model::{CreateProjectRequest, Project, StateFilter, ValueList};
use serde_json::Value;
use tracing::{info, instrument};

use crate::connection::{api_version, required_string_field, Connection};
use crate::error::DevOpsResult;
use crate::transport::Method;

/// Project operations of one account.
#[derive(Clone)]
pub struct ProjectsApi {
    connection: Connection,
    template_id: String,
}

impl ProjectsApi {
    /// Projects created through this API use the process template `template_id`.
    pub fn new(connection: Connection, template_id: impl Into<String>) -> Self {
        Self {
            connection,
            template_id: template_id.into(),
        }
    }

    /// List projects in the given lifecycle state.
    #[instrument(skip(self), fields(state = %state))]
    pub async fn list_projects(&self, state: StateFilter) -> DevOpsResult<Vec<Project>> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "projects"])
            .query("stateFilter", state.as_query())
            .api_version(api_version::CORE);

        let list: ValueList<Project> = self.connection.get(&url).await?;
        Ok(list.into_items())
    }

    /// Queue creation of a Git project. Returns the id of the queued operation.
    ///
    /// Creation is asynchronous on the platform; the project shows up under
    /// [`StateFilter::CreatePending`] until it is well formed.
    #[instrument(skip(self, description))]
    pub async fn create_project(&self, name: &str, description: Option<&str>) -> DevOpsResult<String> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "projects"])
            .api_version(api_version::CORE);

        let request = CreateProjectRequest::git(name, description, self.template_id.as_str());
        let response: Value = self.connection.send_json(Method::Post, &url, &request).await?;
        let id = required_string_field(&response, "id")?;
        info!(operation = %id, "Project creation queued");
        Ok(id)
    }

    /// Queue deletion of a project. Returns the id of the queued operation.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: &str) -> DevOpsResult<String> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "projects", project_id])
            .api_version(api_version::CORE);

        let response = self.connection.send(Method::Delete, &url, None).await?;
        let id = required_string_field(&response, "id")?;
        info!(operation = %id, "Project deletion queued");
        Ok(id)
    }
}
