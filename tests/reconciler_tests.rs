//! Reconciler tests against an in-memory gateway
//!
//! The fake records every call so tests can assert which remote operations
//! were (and were not) issued.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tableau_grants::error::{ReconcileError, TableauError, TableauResult, ValidationError};
use tableau_grants::permissions::{
    Capability, CapabilityMode, CapabilityName, GrantAttributes, Grantee, GranteeCapabilitySet,
    PermissionGateway, Reconciler,
};
use tableau_grants::tableau::types::CapabilityEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    FetchAll(String),
    Upsert(String, Grantee, Capability),
    Remove(String, Grantee, Capability),
}

/// What the fake should answer with
#[derive(Default)]
enum Behavior {
    #[default]
    Succeed,
    NotFound,
    ServerError,
}

#[derive(Default)]
struct FakeGateway {
    sets: Vec<GranteeCapabilitySet>,
    behavior: Behavior,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    fn with_sets(sets: Vec<GranteeCapabilitySet>) -> Self {
        Self {
            sets,
            ..Default::default()
        }
    }

    fn failing(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> TableauResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::NotFound => Err(TableauError::NotFound {
                resource: "permission".into(),
            }),
            Behavior::ServerError => Err(TableauError::Api {
                status: 500,
                message: "boom".into(),
            }),
        }
    }
}

#[async_trait]
impl PermissionGateway for FakeGateway {
    async fn fetch_all(&self, project_id: &str) -> TableauResult<Vec<GranteeCapabilitySet>> {
        self.record(Call::FetchAll(project_id.to_string()))?;
        Ok(self.sets.clone())
    }

    async fn upsert(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()> {
        self.record(Call::Upsert(
            project_id.to_string(),
            grantee.clone(),
            capability,
        ))
    }

    async fn remove(
        &self,
        project_id: &str,
        grantee: &Grantee,
        capability: Capability,
    ) -> TableauResult<()> {
        self.record(Call::Remove(
            project_id.to_string(),
            grantee.clone(),
            capability,
        ))
    }
}

fn reconciler(gateway: &Arc<FakeGateway>) -> Reconciler {
    Reconciler::new(gateway.clone())
}

fn entry(name: &str, mode: &str) -> CapabilityEntry {
    CapabilityEntry {
        name: name.to_string(),
        mode: mode.to_string(),
    }
}

fn read_allow() -> Capability {
    Capability::new(CapabilityName::Read, CapabilityMode::Allow)
}

fn both_grantees() -> GrantAttributes {
    GrantAttributes {
        user_id: Some("u1".into()),
        ..GrantAttributes::for_group("p1", "g1", "Read", "Allow")
    }
}

// ============================================================================
// create
// ============================================================================

#[tokio::test]
async fn test_create_issues_single_upsert() {
    let gateway = Arc::new(FakeGateway::default());
    let attrs = GrantAttributes::for_group("p1", "g1", "Read", "Allow");

    let grant = reconciler(&gateway).create(&attrs).await.unwrap();

    assert_eq!(grant.identifier(), "p1:g1::Read:Allow");
    assert_eq!(
        gateway.calls(),
        vec![Call::Upsert("p1".into(), Grantee::Group("g1".into()), read_allow())]
    );
}

#[tokio::test]
async fn test_create_conflicting_grantee_makes_no_call() {
    let gateway = Arc::new(FakeGateway::default());

    let err = reconciler(&gateway)
        .create(&both_grantees())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::ConflictingGrantee { .. })
    ));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_without_grantee_makes_no_call() {
    let gateway = Arc::new(FakeGateway::default());
    let attrs = GrantAttributes {
        project_id: "p1".into(),
        capability_name: "Read".into(),
        capability_mode: "Allow".into(),
        ..Default::default()
    };

    let err = reconciler(&gateway).create(&attrs).await.unwrap_err();

    match err {
        ReconcileError::Validation(e) => assert!(e.is_conflicting_grantee()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_rejects_lowercase_mode_before_call() {
    let gateway = Arc::new(FakeGateway::default());
    let attrs = GrantAttributes::for_user("p1", "u1", "Read", "allow");

    let err = reconciler(&gateway).create(&attrs).await.unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::InvalidCapabilityMode(_))
    ));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_surfaces_gateway_error_with_context() {
    let gateway = Arc::new(FakeGateway::failing(Behavior::ServerError));
    let attrs = GrantAttributes::for_user("p1", "u1", "Write", "Deny");

    let err = reconciler(&gateway).create(&attrs).await.unwrap_err();

    match &err {
        ReconcileError::UpstreamFailure {
            operation,
            project_id,
            grantee,
            capability,
            source,
        } => {
            assert_eq!(*operation, "create");
            assert_eq!(project_id, "p1");
            assert_eq!(grantee, "user u1");
            assert_eq!(capability, "Write:Deny");
            assert!(matches!(source, TableauError::Api { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Write:Deny"));
    assert_eq!(gateway.calls().len(), 1);
}

// ============================================================================
// verify / read
// ============================================================================

fn scenario_b() -> Arc<FakeGateway> {
    Arc::new(FakeGateway::with_sets(vec![GranteeCapabilitySet {
        grantee: Grantee::Group("g1".into()),
        capabilities: vec![entry("Read", "Allow")],
    }]))
}

#[tokio::test]
async fn test_verify_present_grant() {
    let gateway = scenario_b();
    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_group("p1", "g1", "Read", "Allow"))
        .await
        .unwrap();

    assert!(found);
    assert_eq!(gateway.calls(), vec![Call::FetchAll("p1".into())]);
}

#[tokio::test]
async fn test_verify_other_capability_is_absent() {
    let gateway = scenario_b();
    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_group("p1", "g1", "Write", "Allow"))
        .await
        .unwrap();

    assert!(!found);
}

#[tokio::test]
async fn test_verify_other_group_is_absent() {
    let gateway = scenario_b();
    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_group("p1", "g2", "Read", "Allow"))
        .await
        .unwrap();

    assert!(!found);
}

#[tokio::test]
async fn test_verify_user_does_not_match_group_with_same_id() {
    let gateway = scenario_b();
    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_user("p1", "g1", "Read", "Allow"))
        .await
        .unwrap();

    assert!(!found);
}

#[tokio::test]
async fn test_verify_mode_is_case_sensitive() {
    let gateway = Arc::new(FakeGateway::with_sets(vec![GranteeCapabilitySet {
        grantee: Grantee::Group("g1".into()),
        capabilities: vec![entry("Read", "allow")],
    }]));

    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_group("p1", "g1", "Read", "Allow"))
        .await
        .unwrap();

    assert!(!found);
}

#[tokio::test]
async fn test_verify_empty_capability_list() {
    let gateway = Arc::new(FakeGateway::with_sets(vec![GranteeCapabilitySet {
        grantee: Grantee::User("u1".into()),
        capabilities: vec![],
    }]));

    let found = reconciler(&gateway)
        .verify(&GrantAttributes::for_user("p1", "u1", "Read", "Allow"))
        .await
        .unwrap();

    assert!(!found);
}

#[tokio::test]
async fn test_verify_rejects_conflicting_grantee() {
    let gateway = scenario_b();
    let err = reconciler(&gateway)
        .verify(&both_grantees())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::ConflictingGrantee { .. })
    ));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_read_reports_drift_as_not_found() {
    let gateway = scenario_b();
    let err = reconciler(&gateway)
        .read(&GrantAttributes::for_group("p1", "g1", "Write", "Deny"))
        .await
        .unwrap_err();

    match err {
        ReconcileError::NotFound {
            project_id,
            grantee,
            capability,
        } => {
            assert_eq!(project_id, "p1");
            assert_eq!(grantee, "group g1");
            assert_eq!(capability, "Write:Deny");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_read_transport_failure_is_not_not_found() {
    let gateway = Arc::new(FakeGateway::failing(Behavior::NotFound));
    let err = reconciler(&gateway)
        .read(&GrantAttributes::for_group("p1", "g1", "Read", "Allow"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamFailure { .. }));
    assert!(err.upstream().is_some_and(TableauError::is_not_found));
}

// ============================================================================
// delete
// ============================================================================

#[tokio::test]
async fn test_delete_issues_single_remove_without_fetch() {
    let gateway = Arc::new(FakeGateway::default());
    reconciler(&gateway)
        .delete(&GrantAttributes::for_user("p1", "u1", "Read", "Allow"))
        .await
        .unwrap();

    assert_eq!(
        gateway.calls(),
        vec![Call::Remove("p1".into(), Grantee::User("u1".into()), read_allow())]
    );
}

#[tokio::test]
async fn test_delete_of_absent_grant_succeeds() {
    let gateway = Arc::new(FakeGateway::failing(Behavior::NotFound));
    let result = reconciler(&gateway)
        .delete(&GrantAttributes::for_group("p1", "g1", "Read", "Allow"))
        .await;

    assert!(result.is_ok());
    assert_eq!(gateway.calls().len(), 1);
}

#[tokio::test]
async fn test_delete_propagates_server_error() {
    let gateway = Arc::new(FakeGateway::failing(Behavior::ServerError));
    let err = reconciler(&gateway)
        .delete(&GrantAttributes::for_group("p1", "g1", "Read", "Allow"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::UpstreamFailure {
            operation: "delete",
            ..
        }
    ));
}

// ============================================================================
// update / replace / import / list
// ============================================================================

#[tokio::test]
async fn test_update_with_changes_is_rejected() {
    let gateway = Arc::new(FakeGateway::default());
    let old = GrantAttributes::for_group("p1", "g1", "Read", "Allow");
    let new = GrantAttributes::for_group("p1", "g1", "Read", "Deny");

    let err = reconciler(&gateway).update(&old, &new).await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpdateUnsupported { .. }));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_update_without_changes_is_noop() {
    let gateway = Arc::new(FakeGateway::default());
    let attrs = GrantAttributes::for_group("p1", "g1", "Read", "Allow");

    let grant = reconciler(&gateway).update(&attrs, &attrs).await.unwrap();

    assert_eq!(grant.identifier(), "p1:g1::Read:Allow");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_update_treats_empty_user_id_as_unset() {
    let gateway = Arc::new(FakeGateway::default());
    let old = GrantAttributes::for_group("p1", "g1", "Read", "Allow");
    let new = GrantAttributes {
        user_id: Some(String::new()),
        ..old.clone()
    };

    let grant = reconciler(&gateway).update(&old, &new).await.unwrap();

    assert_eq!(grant.identifier(), "p1:g1::Read:Allow");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_list_failure_names_project() {
    let gateway = Arc::new(FakeGateway::failing(Behavior::ServerError));

    let err = reconciler(&gateway).list("p1").await.unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::UpstreamFailure {
            operation: "list",
            ref project_id,
            ..
        } if project_id == "p1"
    ));
}

#[tokio::test]
async fn test_replace_deletes_then_creates() {
    let gateway = Arc::new(FakeGateway::default());
    let old = GrantAttributes::for_group("p1", "g1", "Read", "Allow");
    let new = GrantAttributes::for_user("p1", "u1", "Write", "Deny");

    let grant = reconciler(&gateway).replace(&old, &new).await.unwrap();

    assert_eq!(grant.identifier(), "p1::u1:Write:Deny");
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Remove("p1".into(), Grantee::Group("g1".into()), read_allow()),
            Call::Upsert(
                "p1".into(),
                Grantee::User("u1".into()),
                Capability::new(CapabilityName::Write, CapabilityMode::Deny)
            ),
        ]
    );
}

#[tokio::test]
async fn test_replace_validates_new_before_deleting_old() {
    let gateway = Arc::new(FakeGateway::default());
    let old = GrantAttributes::for_group("p1", "g1", "Read", "Allow");

    let result = reconciler(&gateway).replace(&old, &both_grantees()).await;

    assert!(result.is_err());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_import_existing_grant() {
    let gateway = scenario_b();
    let grant = reconciler(&gateway)
        .import("p1:g1::Read:Allow")
        .await
        .unwrap();

    assert_eq!(grant.project_id, "p1");
    assert_eq!(grant.grantee, Grantee::Group("g1".into()));
    assert_eq!(grant.capability, read_allow());
}

#[tokio::test]
async fn test_import_malformed_identifier() {
    let gateway = scenario_b();
    let err = reconciler(&gateway)
        .import("p1:g1:Read:Allow")
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Decode(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_import_with_both_grantees_is_rejected() {
    let gateway = scenario_b();
    let err = reconciler(&gateway)
        .import("p1:g1:u1:Read:Allow")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::ConflictingGrantee { .. })
    ));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_list_returns_fetched_sets() {
    let gateway = scenario_b();
    let sets = reconciler(&gateway).list("p1").await.unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].grantee, Grantee::Group("g1".into()));
}
