//! Git repository, import and service endpoint records
//!
//! Repository listings embed their owning project. Importing an external repository
//! requires a service endpoint holding the source credentials; the import request
//! asks the platform to delete that endpoint once the import finishes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::project::Project;

/// A Git repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    /// Repository id
    pub id: String,

    /// Repository name
    pub name: String,

    /// Default branch ref, absent for empty repositories
    #[serde(default)]
    pub default_branch: Option<String>,

    /// REST URL
    #[serde(default)]
    pub url: Option<String>,

    /// Clone URL
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Owning project
    pub project: Project,
}

/// Request body for importing an external Git repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Import parameters
    pub parameters: ImportParameters,
}

impl ImportRequest {
    /// Import from `source_url` using credentials held by `service_endpoint_id`.
    pub fn git(source_url: impl Into<String>, service_endpoint_id: impl Into<String>) -> Self {
        Self {
            parameters: ImportParameters {
                git_source: GitSource {
                    url: source_url.into(),
                },
                service_endpoint_id: service_endpoint_id.into(),
                delete_service_endpoint_after_import_is_done: true,
            },
        }
    }
}

/// Parameters of an import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParameters {
    /// Source repository
    pub git_source: GitSource,

    /// Endpoint holding the source credentials
    pub service_endpoint_id: String,

    /// Remove the endpoint after the import completes
    pub delete_service_endpoint_after_import_is_done: bool,
}

/// Source of a Git import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// Clone URL of the source repository
    pub url: String,
}

/// Request body for creating a username/password Git service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpointRequest {
    /// Endpoint name, unique within the project
    pub name: String,

    /// Endpoint type
    #[serde(rename = "type")]
    pub endpoint_type: String,

    /// Source URL
    pub url: String,

    /// Credentials
    pub authorization: EndpointAuthorization,
}

impl ServiceEndpointRequest {
    /// Build a Git endpoint named `{prefix}-Git-{uuid}`.
    pub fn git(
        prefix: &str,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: format!("{}-Git-{}", prefix, Uuid::new_v4()),
            endpoint_type: "Git".to_string(),
            url: url.into(),
            authorization: EndpointAuthorization {
                scheme: "UsernamePassword".to_string(),
                parameters: UsernamePassword {
                    username: username.into(),
                    password: password.into(),
                },
            },
        }
    }
}

/// Authorization block of a service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAuthorization {
    /// Authorization scheme
    pub scheme: String,

    /// Scheme parameters
    pub parameters: UsernamePassword,
}

/// Username/password credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePassword {
    /// Username
    pub username: String,

    /// Password or token
    pub password: String,
}

impl fmt::Debug for UsernamePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePassword")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_from_wire() {
        let repo: Repo = serde_json::from_value(serde_json::json!({
            "id": "5febef5a-833d-4e14-b9c0-14cb638f91e6",
            "name": "AnotherRepository",
            "url": "https://fabrikam.visualstudio.com/DefaultCollection/_apis/git/repositories/5feb",
            "remoteUrl": "https://fabrikam.visualstudio.com/DefaultCollection/_git/AnotherRepository",
            "project": {
                "id": "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c",
                "name": "Fabrikam-Fiber-Git",
                "state": "wellFormed"
            }
        }))
        .unwrap();

        assert_eq!(repo.name, "AnotherRepository");
        assert!(repo.default_branch.is_none());
        assert_eq!(repo.project.name, "Fabrikam-Fiber-Git");
    }

    #[test]
    fn test_import_request_wire_form() {
        let json = serde_json::to_value(ImportRequest::git("https://github.com/x/y.git", "ep-1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "parameters": {
                    "gitSource": {"url": "https://github.com/x/y.git"},
                    "serviceEndpointId": "ep-1",
                    "deleteServiceEndpointAfterImportIsDone": true
                }
            })
        );
    }

    #[test]
    fn test_service_endpoint_request() {
        let request = ServiceEndpointRequest::git("Import", "https://github.com/x/y.git", "bot", "s3cret");
        assert!(request.name.starts_with("Import-Git-"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "Git");
        assert_eq!(json["authorization"]["scheme"], "UsernamePassword");
        assert_eq!(json["authorization"]["parameters"]["password"], "s3cret");
    }

    #[test]
    fn test_endpoint_names_are_unique() {
        let a = ServiceEndpointRequest::git("Import", "u", "n", "p");
        let b = ServiceEndpointRequest::git("Import", "u", "n", "p");
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let request = ServiceEndpointRequest::git("Import", "u", "bot", "s3cret");
        let debug = format!("{:?}", request);
        assert!(debug.contains("bot"));
        assert!(!debug.contains("s3cret"));
    }
}
