//! Remote permission gateway
//!
//! The reconciler talks to the remote service only through
//! [`PermissionGateway`], which keeps it testable with an in-memory fake.
//! [`TableauClient`] implements it against the project permissions endpoints.

use crate::error::TableauResult;
use crate::permissions::model::{Capability, Grantee, GranteeCapabilitySet};
use crate::tableau::TableauClient;
use crate::tableau::types::{PermissionsEnvelope, ProjectPermissions};
// async_trait required for dyn-compatibility with Arc<dyn PermissionGateway>
use async_trait::async_trait;
use tracing::warn;

/// Operations the reconciler needs from the remote service
#[async_trait]
pub trait PermissionGateway: Send + Sync {
    /// Every grantee capability set currently granted on a project, in server order
    async fn fetch_all(&self, project_id: &str) -> TableauResult<Vec<GranteeCapabilitySet>>;

    /// Grant one capability to one grantee; idempotent on the server side
    async fn upsert(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()>;

    /// Remove the grant addressed by (project, grantee, name, mode)
    async fn remove(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()>;
}

/// Document sent to add a single capability for a single grantee
pub fn upsert_document(grantee: &Grantee, capability: Capability) -> PermissionsEnvelope {
    PermissionsEnvelope {
        permissions: ProjectPermissions {
            project: None,
            grantee_capabilities: vec![grantee.to_wire(vec![capability.into()])],
        },
    }
}

/// Endpoint holding a project's permissions
pub fn permissions_endpoint(project_id: &str) -> String {
    format!(
        "/projects/{}/permissions",
        TableauClient::encode_segment(project_id)
    )
}

/// Endpoint addressing exactly one grant
pub fn grant_endpoint(project_id: &str, grantee: &Grantee, capability: Capability) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        permissions_endpoint(project_id),
        grantee.collection(),
        TableauClient::encode_segment(grantee.id()),
        capability.name,
        capability.mode
    )
}

#[async_trait]
impl PermissionGateway for TableauClient {
    /// Entries naming both a group and a user are dropped rather than
    /// matched for either grantee, so they never satisfy a declared grant.
    async fn fetch_all(&self, project_id: &str) -> TableauResult<Vec<GranteeCapabilitySet>> {
        let envelope: PermissionsEnvelope = self.get(&permissions_endpoint(project_id)).await?;

        let sets = envelope
            .permissions
            .grantee_capabilities
            .into_iter()
            .filter_map(|entry| match GranteeCapabilitySet::try_from(entry) {
                Ok(set) => Some(set),
                Err(entry) => {
                    warn!(
                        project_id,
                        has_group = entry.group.is_some(),
                        has_user = entry.user.is_some(),
                        "Skipping grantee entry without exactly one of group/user"
                    );
                    None
                }
            })
            .collect();

        Ok(sets)
    }

    async fn upsert(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()> {
        let body = upsert_document(grantee, capability);
        self.put_no_content(&permissions_endpoint(project_id), &body)
            .await
    }

    async fn remove(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()> {
        self.delete(&grant_endpoint(project_id, grantee, capability))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::model::{CapabilityMode, CapabilityName};
    use serde_json::json;

    #[test]
    fn test_upsert_document_for_group() {
        let doc = upsert_document(
            &Grantee::Group("g1".into()),
            Capability::new(CapabilityName::Read, CapabilityMode::Allow),
        );

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"permissions": {"granteeCapabilities": [{
                "group": {"id": "g1"},
                "capabilities": {"capability": [{"name": "Read", "mode": "Allow"}]}
            }]}})
        );
    }

    #[test]
    fn test_upsert_document_for_user() {
        let doc = upsert_document(
            &Grantee::User("u1".into()),
            Capability::new(CapabilityName::Write, CapabilityMode::Deny),
        );

        let entries = &doc.permissions.grantee_capabilities;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].group.is_none());
        assert_eq!(entries[0].user.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(entries[0].capabilities.capability.len(), 1);
    }

    #[test]
    fn test_grant_endpoint() {
        let read_allow = Capability::new(CapabilityName::Read, CapabilityMode::Allow);
        assert_eq!(
            grant_endpoint("p1", &Grantee::Group("g1".into()), read_allow),
            "/projects/p1/permissions/groups/g1/Read/Allow"
        );

        let write_deny = Capability::new(CapabilityName::Write, CapabilityMode::Deny);
        assert_eq!(
            grant_endpoint("p1", &Grantee::User("u 1".into()), write_deny),
            "/projects/p1/permissions/users/u%201/Write/Deny"
        );
    }
}
