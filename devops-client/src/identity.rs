//! Identity resolution and bind-pending provisioning.
//!
//! Resolves an email address to exactly one platform identity. When an account has
//! never seen the email, the identity is provisioned as "bind-pending" by adding a
//! provisional UPN descriptor to the collection's licensed users group, and a license
//! is then assigned to it.
//!
//! Calls within a flow are strictly sequential; each step needs data from the
//! previous one. Only the post-provisioning lookup is repeated, because it is an
//! idempotent GET.

use devops_model::identity::{collection_group_descriptor, directory_of};
use devops_model::{Descriptor, Identity, LicenseKind, ValueList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::connection::{api_version, Connection};
use crate::error::{DevOpsError, DevOpsResult};
use crate::retry::{poll_until_found, RetryConfig};
use crate::transport::Method;

/// How an identity lookup interprets its filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    /// Match the account (sign-in) name
    AccountName,

    /// Match the mail address
    MailAddress,
}

impl SearchFilter {
    /// The query-string value for this filter.
    pub fn as_query(&self) -> &'static str {
        match self {
            SearchFilter::AccountName => "AccountName",
            SearchFilter::MailAddress => "MailAddress",
        }
    }
}

/// The member half of an add-member call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMember {
    /// Address the member by descriptor (required for bind-pending users)
    Descriptor(Descriptor),

    /// Address the member by identity id
    Id(String),
}

impl fmt::Display for GroupMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupMember::Descriptor(descriptor) => write!(f, "{}", descriptor),
            GroupMember::Id(id) => f.write_str(id),
        }
    }
}

/// Identity as returned by the identities API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    id: String,
    descriptor: Descriptor,
    #[serde(default)]
    provider_display_name: Option<String>,
    #[serde(default)]
    custom_display_name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

/// `{"$type": ..., "$value": ...}` property wrapper.
#[derive(Debug, Clone, Deserialize)]
struct PropertyValue {
    #[serde(rename = "$value", default)]
    value: serde_json::Value,
}

impl IdentityRecord {
    fn property(&self, name: &str) -> Option<String> {
        match &self.properties.get(name)?.value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<IdentityRecord> for Identity {
    fn from(record: IdentityRecord) -> Self {
        let unique_name = record
            .property("Account")
            .or_else(|| record.property("Mail"))
            .unwrap_or_default();
        let display_name = record
            .custom_display_name
            .clone()
            .or_else(|| record.provider_display_name.clone())
            .unwrap_or_else(|| unique_name.clone());

        Identity {
            id: record.id,
            display_name,
            unique_name,
            descriptor: record.descriptor,
            image_url: record.image_url,
        }
    }
}

/// Collection scope as returned by the scopes API.
#[derive(Debug, Deserialize)]
struct ScopeRecord {
    id: Uuid,
}

/// Connection data; only the authorized caller is needed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionData {
    authorized_user: CallerRecord,
}

#[derive(Debug, Deserialize)]
struct CallerRecord {
    descriptor: Descriptor,
}

/// Entitlement assignment body.
#[derive(Debug, Serialize)]
struct EntitlementRequest<'a> {
    license: &'a str,
}

/// Finds identities by email and provisions bind-pending users.
#[derive(Clone)]
pub struct IdentityResolver {
    connection: Connection,
    provisioning: RetryConfig,
}

impl IdentityResolver {
    /// Create a resolver. `provisioning` bounds the lookups made after a
    /// bind-pending identity has been created.
    pub fn new(connection: Connection, provisioning: RetryConfig) -> Self {
        Self {
            connection,
            provisioning,
        }
    }

    /// List every identity matching `value` under `filter`.
    #[instrument(skip(self))]
    pub async fn lookup(&self, filter: SearchFilter, value: &str) -> DevOpsResult<Vec<Identity>> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "identities"])
            .query("searchFilter", filter.as_query())
            .query("filterValue", value)
            .api_version(api_version::CORE);

        let list: ValueList<IdentityRecord> = self.connection.get(&url).await?;
        let identities: Vec<Identity> = list.into_items().into_iter().map(Identity::from).collect();
        debug!(matches = identities.len(), "Identity lookup complete");
        Ok(identities)
    }

    /// Look up by mail address; exactly one match is required.
    ///
    /// Zero and several matches both fail with `AmbiguousOrMissingIdentity`.
    #[instrument(skip(self))]
    pub async fn find_identity(&self, email: &str) -> DevOpsResult<Identity> {
        let mut identities = self.lookup(SearchFilter::MailAddress, email).await?;
        if identities.len() != 1 {
            warn!(matches = identities.len(), "No exact identity match");
            return Err(DevOpsError::AmbiguousOrMissingIdentity {
                email: email.to_string(),
                matches: identities.len(),
            });
        }
        Ok(identities.remove(0))
    }

    /// Look up by account name; `None` for no match, an error for several.
    async fn find_account(&self, email: &str) -> DevOpsResult<Option<Identity>> {
        let mut identities = self.lookup(SearchFilter::AccountName, email).await?;
        match identities.len() {
            0 => Ok(None),
            1 => Ok(identities.pop()),
            matches => Err(DevOpsError::AmbiguousOrMissingIdentity {
                email: email.to_string(),
                matches,
            }),
        }
    }

    /// Read one identity (a user or a team) by id.
    #[instrument(skip(self))]
    pub async fn read_identity(&self, id: &str) -> DevOpsResult<Identity> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "identities", id])
            .api_version(api_version::CORE);

        let record: IdentityRecord = self.connection.get(&url).await?;
        Ok(record.into())
    }

    /// Resolve `email` to an identity, provisioning a bind-pending one if needed,
    /// and assign `license` to it.
    ///
    /// An existing identity is returned unchanged and no provisioning call is made.
    #[instrument(skip(self), fields(license = %license))]
    pub async fn resolve_or_provision(&self, email: &str, license: LicenseKind) -> DevOpsResult<Identity> {
        let identity = match self.find_account(email).await? {
            Some(identity) => {
                debug!(id = %identity.id, "Identity already exists");
                identity
            }
            None => self.provision_bind_pending(email).await?,
        };

        self.assign_license(&identity.id, license).await?;
        info!(id = %identity.id, "Identity resolved and licensed");
        Ok(identity)
    }

    /// Create a bind-pending identity for `email` and wait for it to resolve.
    ///
    /// Only an identity whose account name equals `email` (ignoring ASCII case)
    /// counts as resolved; any other match keeps the lookup polling.
    #[instrument(skip(self))]
    pub async fn provision_bind_pending(&self, email: &str) -> DevOpsResult<Identity> {
        info!("Creating a bind-pending identity in the licensed users group");

        let scope_id = self.collection_scope_id().await?;
        let group = collection_group_descriptor(&scope_id, &Descriptor::licensed_users_group())?;
        let directory = self.caller_directory().await?;
        let member = Descriptor::bind_pending(&directory, email);

        self.add_member_to_group(&group, &GroupMember::Descriptor(member))
            .await?;

        let resolved = poll_until_found(&self.provisioning, move || async move {
            let found = self.find_account(email).await?;
            Ok::<_, DevOpsError>(found.filter(|identity| {
                let matches = identity.unique_name.eq_ignore_ascii_case(email);
                if !matches {
                    warn!(unique_name = %identity.unique_name, "Lookup returned a different account name");
                }
                matches
            }))
        })
        .await?;

        resolved.ok_or_else(|| DevOpsError::ProvisioningFailed {
            email: email.to_string(),
            attempts: self.provisioning.max_attempts.max(1),
        })
    }

    /// Id of the account's project collection scope.
    #[instrument(skip(self))]
    pub async fn collection_scope_id(&self) -> DevOpsResult<Uuid> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "identities", "scopes"])
            .query("scopeName", self.connection.account())
            .api_version(api_version::CORE);

        let scope: ScopeRecord = self.connection.get(&url).await?;
        Ok(scope.id)
    }

    /// Directory of the identity the token belongs to.
    #[instrument(skip(self))]
    pub async fn caller_directory(&self) -> DevOpsResult<String> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "connectionData"])
            .finish();

        let data: ConnectionData = self.connection.get(&url).await?;
        Ok(directory_of(&data.authorized_user.descriptor.identifier).to_string())
    }

    /// Add `member` to the group addressed by `container`.
    ///
    /// Not idempotent-safe; callers must not repeat it blindly.
    #[instrument(skip(self), fields(container = %container, member = %member))]
    pub async fn add_member_to_group(&self, container: &Descriptor, member: &GroupMember) -> DevOpsResult<()> {
        let container = container.to_string();
        let member = member.to_string();
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "identities", &container, "members", &member])
            .api_version(api_version::CORE);

        self.connection.send(Method::Post, &url, None).await?;
        Ok(())
    }

    /// Assign the platform license for `license` to an identity.
    #[instrument(skip(self), fields(license = %license))]
    pub async fn assign_license(&self, identity_id: &str, license: LicenseKind) -> DevOpsResult<()> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "licensing", "entitlements", identity_id])
            .api_version(api_version::CORE);

        let body = EntitlementRequest {
            license: license.license_id(),
        };
        let _: serde_json::Value = self.connection.send_json(Method::Post, &url, &body).await?;
        debug!(license_id = license.license_id(), "License assigned");
        Ok(())
    }
}
