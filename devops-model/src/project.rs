//! Project records
//!
//! This module provides the read-only `Project` record returned by project listings,
//! the state filter used when listing, and the request body used to create a
//! Git-backed project from a process template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id (GUID string)
    pub id: String,

    /// Project name
    pub name: String,

    /// Project description
    #[serde(default)]
    pub description: Option<String>,

    /// Lifecycle state, e.g. `wellFormed`
    #[serde(default)]
    pub state: Option<String>,

    /// REST URL of the project
    #[serde(default)]
    pub url: Option<String>,
}

/// Which project lifecycle states a listing should include.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StateFilter {
    /// Fully created projects
    WellFormed,

    /// Projects whose creation has been queued
    CreatePending,

    /// Projects being deleted
    Deleting,

    /// Projects that have just been created
    New,

    /// Every project regardless of state
    #[default]
    All,
}

impl StateFilter {
    /// The query-string value for this filter.
    pub fn as_query(&self) -> &'static str {
        match self {
            StateFilter::WellFormed => "WellFormed",
            StateFilter::CreatePending => "CreatePending",
            StateFilter::Deleting => "Deleting",
            StateFilter::New => "New",
            StateFilter::All => "All",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Request body for creating a project.
///
/// # Examples
///
/// ```
/// use devops_model::CreateProjectRequest;
///
/// let request = CreateProjectRequest::git("Payments", Some("Payments team"), "template-id");
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["capabilities"]["versioncontrol"]["sourceControlType"], "Git");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Source control and process capabilities
    pub capabilities: ProjectCapabilities,
}

impl CreateProjectRequest {
    /// Build a request for a Git project using the given process template.
    pub fn git(
        name: impl Into<String>,
        description: Option<&str>,
        template_type_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            capabilities: ProjectCapabilities {
                version_control: VersionControl {
                    source_control_type: "Git".to_string(),
                },
                process_template: ProcessTemplate {
                    template_type_id: template_type_id.into(),
                },
            },
        }
    }
}

/// Capabilities block of a project creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCapabilities {
    /// Source control settings
    #[serde(rename = "versioncontrol")]
    pub version_control: VersionControl,

    /// Process template settings
    #[serde(rename = "processTemplate")]
    pub process_template: ProcessTemplate,
}

/// Source control capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionControl {
    /// `Git` or `Tfvc`
    pub source_control_type: String,
}

/// Process template capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTemplate {
    /// Template id
    pub template_type_id: String,
}
