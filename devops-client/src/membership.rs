//! Team membership.

use devops_model::{Member, Team, ValueList};
use tracing::{info, instrument};

use crate::connection::{api_version, Connection};
use crate::error::DevOpsResult;
use crate::identity::{GroupMember, IdentityResolver};

/// Adds users to teams and lists team rosters.
#[derive(Clone)]
pub struct MembershipManager {
    connection: Connection,
    identities: IdentityResolver,
}

impl MembershipManager {
    /// Create a manager that resolves users through `identities`.
    pub fn new(connection: Connection, identities: IdentityResolver) -> Self {
        Self {
            connection,
            identities,
        }
    }

    /// Add the user with `email` to the team whose identity id is `team_id`.
    ///
    /// The email must match exactly one identity by mail address. The team is read
    /// for its descriptor and the user is added by id. No provisioning happens here;
    /// use [`IdentityResolver::resolve_or_provision`] for users new to the account.
    #[instrument(skip(self))]
    pub async fn add_user_to_team(&self, email: &str, team_id: &str) -> DevOpsResult<()> {
        let user = self.identities.find_identity(email).await?;
        let team = self.identities.read_identity(team_id).await?;

        self.identities
            .add_member_to_group(&team.descriptor, &GroupMember::Id(user.id.clone()))
            .await?;

        info!(user = %user.id, team = %team.display_name, "User added to team");
        Ok(())
    }

    /// List the teams of a project.
    #[instrument(skip(self))]
    pub async fn list_teams(&self, project: &str) -> DevOpsResult<Vec<Team>> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "projects", project, "teams"])
            .api_version(api_version::CORE);

        let list: ValueList<Team> = self.connection.get(&url).await?;
        Ok(list.into_items())
    }

    /// List the members of a team.
    #[instrument(skip(self))]
    pub async fn list_members(&self, project: &str, team: &str) -> DevOpsResult<Vec<Member>> {
        let url = self
            .connection
            .collection()?
            .segments(&["_apis", "projects", project, "teams", team, "members"])
            .api_version(api_version::CORE);

        let list: ValueList<Member> = self.connection.get(&url).await?;
        Ok(list.into_items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevOpsError;
    use crate::retry::RetryConfig;
    use crate::testing::{connection, RecordingTransport};
    use crate::transport::Method;
    use serde_json::json;
    use std::sync::Arc;

    const TEAM_DESCRIPTOR: &str = "Microsoft.TeamFoundation.Identity;S-1-9-1551374245-1204400969-2402986413-2179408616-0-0-0-0-1";

    fn manager(transport: Arc<RecordingTransport>) -> MembershipManager {
        let connection = connection(transport);
        let identities = IdentityResolver::new(connection.clone(), RetryConfig::no_retry());
        MembershipManager::new(connection, identities)
    }

    fn user(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "descriptor": "Microsoft.IdentityModel.Claims.ClaimsIdentity;contoso\\jamal@contoso.com",
            "providerDisplayName": "Jamal Hartnett",
            "properties": {"Mail": {"$type": "System.String", "$value": "jamal@contoso.com"}}
        })
    }

    #[tokio::test]
    async fn test_add_user_to_team() {
        let transport = RecordingTransport::new();
        transport
            .on_json(Method::Get, "_apis/identities?", json!({"count": 1, "value": [user("u1")]}))
            .on_json(
                Method::Get,
                "_apis/identities/team-1",
                json!({
                    "id": "team-1",
                    "descriptor": TEAM_DESCRIPTOR,
                    "providerDisplayName": "[Fabrikam]\\Fabrikam Team"
                }),
            )
            .on_json(Method::Post, "/members/", json!(true));

        manager(transport.clone())
            .add_user_to_team("jamal@contoso.com", "team-1")
            .await
            .unwrap();

        let adds = transport.calls_matching(Method::Post, "/members/");
        assert_eq!(adds.len(), 1);
        assert!(adds[0]
            .url
            .contains(&format!("/_apis/identities/{}/members/u1?", TEAM_DESCRIPTOR)));
        assert!(adds[0].body.is_none());
    }

    #[tokio::test]
    async fn test_add_user_to_team_rejects_duplicate_matches() {
        let transport = RecordingTransport::new();
        transport.on_json(
            Method::Get,
            "_apis/identities?",
            json!({"count": 2, "value": [user("u1"), user("u2")]}),
        );

        let err = manager(transport.clone())
            .add_user_to_team("jamal@contoso.com", "team-1")
            .await
            .unwrap_err();

        assert!(matches!(err, DevOpsError::AmbiguousOrMissingIdentity { matches: 2, .. }));
        assert!(transport.calls_matching(Method::Post, "/members/").is_empty());
        assert!(transport.calls_matching(Method::Get, "team-1").is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_user_to_team() {
        let transport = RecordingTransport::new();
        transport.on_json(Method::Get, "_apis/identities?", json!({"count": 0, "value": []}));

        let err = manager(transport.clone())
            .add_user_to_team("nobody@contoso.com", "team-1")
            .await
            .unwrap_err();

        assert!(matches!(err, DevOpsError::AmbiguousOrMissingIdentity { matches: 0, .. }));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_teams_and_members() {
        let transport = RecordingTransport::new();
        transport
            .on_json(
                Method::Get,
                "/teams/team-1/members",
                json!({"count": 1, "value": [{"id": "u1", "displayName": "Jamal Hartnett", "uniqueName": "jamal@contoso.com"}]}),
            )
            .on_json(
                Method::Get,
                "/teams",
                json!({"count": 2, "value": [{"id": "team-1", "name": "Web"}, {"id": "team-2", "name": "Mobile"}]}),
            );

        let manager = manager(transport.clone());
        let teams = manager.list_teams("Fabrikam Fiber").await.unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[1].name, "Mobile");

        let members = manager.list_members("Fabrikam Fiber", "team-1").await.unwrap();
        assert_eq!(members[0].unique_name.as_deref(), Some("jamal@contoso.com"));

        assert!(transport.calls()[0]
            .url
            .contains("/_apis/projects/Fabrikam%20Fiber/teams?api-version=1.0"));
    }
}
