//! Project property reads and patches.
//!
//! Writes are expressed as a [`PatchDocument`] and submitted in a single PATCH so the
//! platform applies every operation of a call as one unit. Properties are addressed
//! from the instance URL rather than the project collection.

use chrono::{DateTime, Utc};
use devops_model::{PatchDocument, ProjectProperties, PropertyMap, ValueList};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::connection::{api_version, string_field, Connection};
use crate::error::DevOpsResult;
use crate::transport::Method;

/// One entry of a property listing.
#[derive(Debug, Deserialize)]
struct PropertyRecord {
    name: String,
    #[serde(default)]
    value: Value,
}

impl PropertyRecord {
    fn into_pair(self) -> (String, String) {
        let value = match self.value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        (self.name, value)
    }
}

/// Reads and patches the property bag of projects.
#[derive(Clone)]
pub struct PropertyPatcher {
    connection: Connection,
}

impl PropertyPatcher {
    /// Create a patcher for the projects of one account.
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    fn properties_url(&self, project_id: &str, keys: &[&str]) -> DevOpsResult<String> {
        let mut url = self
            .connection
            .instance()?
            .segments(&["_apis", "projects", project_id, "properties"]);
        if !keys.is_empty() {
            url = url.query("keys", &keys.join(","));
        }
        Ok(url.api_version(api_version::PROPERTIES))
    }

    async fn patch(&self, project_id: &str, document: &PatchDocument) -> DevOpsResult<Value> {
        let url = self.properties_url(project_id, &[])?;
        debug!(operations = document.len(), "Patching project properties");
        self.connection.send_json(Method::Patch, &url, document).await
    }

    /// Add or replace every entry of `properties`. Other keys are left untouched.
    ///
    /// An empty map sends nothing.
    #[instrument(skip(self, properties), fields(count = properties.len()))]
    pub async fn set_properties(&self, project_id: &str, properties: &PropertyMap) -> DevOpsResult<()> {
        if properties.is_empty() {
            return Ok(());
        }
        self.patch(project_id, &PatchDocument::additions(properties))
            .await?;
        Ok(())
    }

    /// Remove `keys` from the project. Returns the response `id`, if the platform
    /// sent one.
    ///
    /// An empty key list sends nothing and returns `None`.
    #[instrument(skip(self))]
    pub async fn delete_properties(&self, project_id: &str, keys: &[&str]) -> DevOpsResult<Option<String>> {
        if keys.is_empty() {
            return Ok(None);
        }
        let response = self
            .patch(project_id, &PatchDocument::removals(keys))
            .await?;
        Ok(string_field(&response, "id"))
    }

    /// Read properties of a project; every property when `keys` is empty.
    ///
    /// The result never holds a name outside `keys`, even if the platform lists
    /// one. When the listing repeats a name the later value wins.
    #[instrument(skip(self))]
    pub async fn get_properties(&self, project_id: &str, keys: &[&str]) -> DevOpsResult<PropertyMap> {
        let url = self.properties_url(project_id, keys)?;
        let list: ValueList<PropertyRecord> = self.connection.get(&url).await?;
        Ok(list
            .into_items()
            .into_iter()
            .filter(|record| keys.is_empty() || keys.contains(&record.name.as_str()))
            .map(PropertyRecord::into_pair)
            .collect())
    }

    /// Record who created a project and when.
    #[instrument(skip(self, at))]
    pub async fn stamp_provenance(
        &self,
        project_id: &str,
        created_by: &str,
        at: DateTime<Utc>,
    ) -> DevOpsResult<()> {
        let properties = ProjectProperties::provenance(created_by, at);
        self.set_properties(project_id, &properties).await
    }

    /// Set the billing cost code of a project.
    #[instrument(skip(self))]
    pub async fn set_cost_code(&self, project_id: &str, code: &str) -> DevOpsResult<()> {
        let mut properties = PropertyMap::new();
        properties.insert(ProjectProperties::COST_CODE.to_string(), code.to_string());
        self.set_properties(project_id, &properties).await
    }
}
