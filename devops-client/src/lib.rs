//! # DevOps Client
//!
//! This crate provides an async client for a hosted project-management and
//! source-control platform (Azure DevOps / VSTS style REST API), focused on the
//! account administration flows that span several API calls.
//!
//! ## Overview
//!
//! The devops-client crate handles:
//! - **Identities**: Resolving an email to exactly one identity, provisioning
//!   bind-pending users and assigning licenses
//! - **Membership**: Adding users to teams, listing teams and members
//! - **Properties**: Reading and patching project property bags
//! - **Projects and repos**: Project lifecycle, repository import and Git service endpoints
//! - **Transport**: A pluggable [`Transport`] seam with a `reqwest` implementation
//!
//! ## Provisioning
//!
//! A user the account has never seen is added as a *bind-pending* identity: a
//! provisional `upn:{directory}\{email}` descriptor is placed in the collection's
//! licensed users group, and the account binds it to a real identity at first
//! sign-in. The client then polls the identity lookup with bounded backoff until
//! the new identity is visible, and assigns the requested license.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use devops_client::{ClientConfig, DevOpsClient};
//! use devops_model::LicenseKind;
//!
//! async fn onboard() -> Result<(), devops_client::DevOpsError> {
//!     let client = DevOpsClient::new(ClientConfig::for_account("fabrikam", "my-pat"))?;
//!
//!     let user = client
//!         .add_user_to_account("new.hire@fabrikam.com", Some(LicenseKind::Basic))
//!         .await?;
//!     println!("{} is {}", user.unique_name, user.id);
//!
//!     client.add_user_to_team("new.hire@fabrikam.com", "team-id").await?;
//!     client.properties().set_cost_code("project-id", "CC-42").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! [`ClientConfig::from_env`] reads `DEVOPS_ACCOUNT`, `DEVOPS_PERSONAL_ACCESS_TOKEN`
//! and the optional `DEVOPS_*` overrides documented on [`ClientConfig`].
//!
//! ## Logging
//!
//! Every remote operation is instrumented with `tracing`. The crate installs no
//! subscriber; tokens and passwords are never recorded.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod identity;
pub mod membership;
pub mod projects;
pub mod properties;
pub mod repos;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::DevOpsClient;
pub use config::{ClientConfig, ConfigError, Credentials};
pub use connection::Connection;
pub use error::{DevOpsError, DevOpsResult, TransportError};
pub use identity::{GroupMember, IdentityResolver, SearchFilter};
pub use membership::MembershipManager;
pub use projects::ProjectsApi;
pub use properties::PropertyPatcher;
pub use repos::ReposApi;
pub use retry::{poll_until_found, RetryConfig};
pub use transport::{ApiUrl, HttpTransport, Method, Transport};
