//! Account-level client.
//!
//! `DevOpsClient` wires one [`Connection`] into every component and exposes the
//! orchestration flows that span them.

use devops_model::{Identity, LicenseKind};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::DevOpsResult;
use crate::identity::IdentityResolver;
use crate::membership::MembershipManager;
use crate::projects::ProjectsApi;
use crate::properties::PropertyPatcher;
use crate::repos::ReposApi;
use crate::transport::{HttpTransport, Transport};

/// Client for one account.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct DevOpsClient {
    /// Default license for users added to the account.
    default_license: LicenseKind,

    identities: IdentityResolver,
    membership: MembershipManager,
    properties: PropertyPatcher,
    projects: ProjectsApi,
    repos: ReposApi,
}

impl DevOpsClient {
    /// Create a client backed by HTTP.
    pub fn new(config: ClientConfig) -> DevOpsResult<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client from `DEVOPS_*` environment variables.
    pub fn from_env() -> DevOpsResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Create a client over any transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> DevOpsResult<Self> {
        let connection = Connection::new(&config, transport)?;
        let identities = IdentityResolver::new(connection.clone(), config.provisioning_retry());

        info!(account = %connection.account(), "DevOps client ready");

        Ok(Self {
            default_license: config.default_license,
            membership: MembershipManager::new(connection.clone(), identities.clone()),
            properties: PropertyPatcher::new(connection.clone()),
            projects: ProjectsApi::new(connection.clone(), config.project_template_id),
            repos: ReposApi::new(connection, config.endpoint_prefix),
            identities,
        })
    }

    /// Identity lookups and provisioning.
    pub fn identities(&self) -> &IdentityResolver {
        &self.identities
    }

    /// Team membership.
    pub fn membership(&self) -> &MembershipManager {
        &self.membership
    }

    /// Project properties.
    pub fn properties(&self) -> &PropertyPatcher {
        &self.properties
    }

    /// Projects.
    pub fn projects(&self) -> &ProjectsApi {
        &self.projects
    }

    /// Repositories and service endpoints.
    pub fn repos(&self) -> &ReposApi {
        &self.repos
    }

    /// Make sure `email` exists in the account and holds a license.
    ///
    /// Uses the configured default license when `license` is `None`.
    #[instrument(skip(self))]
    pub async fn add_user_to_account(&self, email: &str, license: Option<LicenseKind>) -> DevOpsResult<Identity> {
        let license = license.unwrap_or(self.default_license);
        self.identities.resolve_or_provision(email, license).await
    }

    /// Add an existing account user to a team.
    pub async fn add_user_to_team(&self, email: &str, team_id: &str) -> DevOpsResult<()> {
        self.membership.add_user_to_team(email, team_id).await
    }
}
