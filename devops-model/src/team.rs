//! Team and team member records
//!
//! Flat read-only records returned by the team listing endpoints. A team is itself
//! an identity on the platform; `identity_url` points at that identity.

use serde::{Deserialize, Serialize};

/// A team within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team id, also the id of the team's identity
    pub id: String,

    /// Team name
    pub name: String,

    /// Team description
    #[serde(default)]
    pub description: Option<String>,

    /// REST URL of the team
    #[serde(default)]
    pub url: Option<String>,

    /// REST URL of the team's identity
    #[serde(default)]
    pub identity_url: Option<String>,
}

/// A member of a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identity id
    pub id: String,

    /// Display name
    pub display_name: String,

    /// Account name, normally an email
    #[serde(default)]
    pub unique_name: Option<String>,

    /// REST URL of the member's identity
    #[serde(default)]
    pub url: Option<String>,

    /// Avatar URL
    #[serde(default)]
    pub image_url: Option<String>,
}
