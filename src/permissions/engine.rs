//! Reconciliation of declared grants against remote state
//!
//! Each operation handles one grant and issues at most one remote call
//! (`replace` is the exception: it is a delete followed by a create).
//! Nothing is cached between calls and nothing is retried.

use crate::error::{ReconcileError, ReconcileResult, TableauError};
use crate::permissions::gateway::PermissionGateway;
use crate::permissions::identity;
use crate::permissions::model::{DeclaredGrant, GrantAttributes, GranteeCapabilitySet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Whether any fetched set grants the declared capability to the declared grantee
///
/// Full linear scan; project grant lists are small.
pub fn contains_grant(sets: &[GranteeCapabilitySet], grant: &DeclaredGrant) -> bool {
    sets.iter()
        .any(|set| set.grants(&grant.grantee, &grant.capability))
}

/// Drives create / read / delete / import for project permission grants
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn PermissionGateway>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn PermissionGateway>) -> Self {
        Self { gateway }
    }

    /// Grant the declared capability
    ///
    /// Validation happens before any remote call.
    #[instrument(skip(self, attrs), fields(project_id = %attrs.project_id))]
    pub async fn create(&self, attrs: &GrantAttributes) -> ReconcileResult<DeclaredGrant> {
        let grant = attrs.validate()?;

        self.gateway
            .upsert(&grant.project_id, &grant.grantee, grant.capability)
            .await
            .map_err(|e| upstream("create", &grant, e))?;

        info!(id = %grant, "Created project permission");
        Ok(grant)
    }

    /// Whether the declared grant is currently present on the project
    #[instrument(skip(self, attrs), fields(project_id = %attrs.project_id))]
    pub async fn verify(&self, attrs: &GrantAttributes) -> ReconcileResult<bool> {
        let grant = attrs.validate()?;
        self.verify_grant(&grant).await
    }

    async fn verify_grant(&self, grant: &DeclaredGrant) -> ReconcileResult<bool> {
        let sets = self
            .gateway
            .fetch_all(&grant.project_id)
            .await
            .map_err(|e| upstream("read", grant, e))?;

        let found = contains_grant(&sets, grant);
        debug!(id = %grant, grantees = sets.len(), found, "Scanned project permissions");
        Ok(found)
    }

    /// Refresh a grant that is expected to exist
    ///
    /// A grant missing remotely is reported as [`ReconcileError::NotFound`];
    /// out-of-band removals are surfaced, never silently re-created.
    #[instrument(skip(self, attrs), fields(project_id = %attrs.project_id))]
    pub async fn read(&self, attrs: &GrantAttributes) -> ReconcileResult<DeclaredGrant> {
        let grant = attrs.validate()?;

        if self.verify_grant(&grant).await? {
            return Ok(grant);
        }

        warn!(id = %grant, "Permission missing from project, drift detected");
        Err(ReconcileError::NotFound {
            project_id: grant.project_id.clone(),
            grantee: grant.grantee.to_string(),
            capability: grant.capability.to_string(),
        })
    }

    /// Remove the declared grant without reading first
    ///
    /// A grant that is already absent counts as removed.
    #[instrument(skip(self, attrs), fields(project_id = %attrs.project_id))]
    pub async fn delete(&self, attrs: &GrantAttributes) -> ReconcileResult<()> {
        let grant = attrs.validate()?;

        match self
            .gateway
            .remove(&grant.project_id, &grant.grantee, grant.capability)
            .await
        {
            Ok(()) => {
                info!(id = %grant, "Deleted project permission");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(id = %grant, "Permission already absent, treating delete as done");
                Ok(())
            }
            Err(e) => Err(upstream("delete", &grant, e)),
        }
    }

    /// In-place updates are not supported
    ///
    /// Identical attributes are a no-op; any change must go through
    /// [`Reconciler::replace`].
    #[instrument(skip(self, old), fields(project_id = %new.project_id))]
    pub async fn update(
        &self,
        old: &GrantAttributes,
        new: &GrantAttributes,
    ) -> ReconcileResult<DeclaredGrant> {
        let previous = old.validate()?;
        let grant = new.validate()?;
        if previous == grant {
            return Ok(grant);
        }

        info!("Project permissions do not support updates");
        Err(ReconcileError::UpdateUnsupported {
            identifier: grant.identifier(),
        })
    }

    /// Realize a declared change as delete(old) followed by create(new)
    #[instrument(skip(self, old), fields(project_id = %new.project_id))]
    pub async fn replace(
        &self,
        old: &GrantAttributes,
        new: &GrantAttributes,
    ) -> ReconcileResult<DeclaredGrant> {
        let previous = old.validate()?;
        let next = new.validate()?;
        if previous == next {
            return Ok(next);
        }

        self.delete(old).await?;
        self.create(new).await
    }

    /// Adopt an existing grant by its compound identifier
    #[instrument(skip(self))]
    pub async fn import(&self, identifier: &str) -> ReconcileResult<DeclaredGrant> {
        let attrs = identity::decode(identifier)?;
        self.read(&attrs).await
    }

    /// All grantee capability sets on a project
    #[instrument(skip(self))]
    pub async fn list(&self, project_id: &str) -> ReconcileResult<Vec<GranteeCapabilitySet>> {
        self.gateway
            .fetch_all(project_id)
            .await
            .map_err(|source| ReconcileError::UpstreamFailure {
                operation: "list",
                project_id: project_id.to_string(),
                grantee: "all grantees".to_string(),
                capability: "all capabilities".to_string(),
                source,
            })
    }
}

fn upstream(operation: &'static str, grant: &DeclaredGrant, source: TableauError) -> ReconcileError {
    ReconcileError::UpstreamFailure {
        operation,
        project_id: grant.project_id.clone(),
        grantee: grant.grantee.to_string(),
        capability: grant.capability.to_string(),
        source,
    }
}
