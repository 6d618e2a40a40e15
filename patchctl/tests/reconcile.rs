//! End-to-end reconciliation tests against a recording transport double.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use patchctl::desired::{DesiredState, PatchConfigSpec, TicketSpec};
use patchctl::error::Error;
use patchctl::transport::{Filter, Mutation, Transport};
use patchctl::{resolve, PatchConfigReconciler, Reconcile, TicketReconciler};

/// Transport double: serves canned collections, records every mutation.
struct MockTransport {
    collections: HashMap<String, Vec<Value>>,
    mutate_response: Value,
    mutations: Mutex<Vec<Mutation>>,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            collections: HashMap::new(),
            mutate_response: json!({"status": "success"}),
            mutations: Mutex::new(Vec::new()),
        }
    }

    fn with_collection(mut self, object: &str, items: Value) -> Self {
        let items = items.as_array().expect("collection fixture must be an array");
        self.collections.insert(object.to_string(), items.clone());
        self
    }

    fn with_mutate_response(mut self, response: Value) -> Self {
        self.mutate_response = response;
        self
    }

    fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_collection(
        &self,
        object: &str,
        _filter: Option<Filter<'_>>,
    ) -> patchctl::Result<Vec<Value>> {
        self.collections
            .get(object)
            .cloned()
            .ok_or_else(|| Error::Envelope(object.to_string()))
    }

    async fn mutate(&self, mutation: Mutation) -> patchctl::Result<Value> {
        self.mutations.lock().unwrap().push(mutation);
        Ok(self.mutate_response.clone())
    }
}

fn config_spec() -> PatchConfigSpec {
    PatchConfigSpec {
        name: "Automated server updates".to_string(),
        description: "Install select patches to devices".to_string(),
        policy_name: "Update Servers".to_string(),
        hosts: vec!["HOSTA".to_string(), "HOSTB".to_string()],
        patch_types: vec!["Cumulative Update for Windows Server".to_string()],
    }
}

fn ticket_spec(state: DesiredState) -> TicketSpec {
    TicketSpec {
        name: "Maintenance window".to_string(),
        policy_name: Some("Update Servers".to_string()),
        hosts: vec!["HOSTA".to_string(), "HOSTB".to_string()],
        patch_types: vec!["Cumulative Update".to_string()],
        state,
    }
}

/// Fixtures for a patch-config creation run: nothing exists yet.
fn creation_fixtures() -> MockTransport {
    MockTransport::new()
        .with_collection("viewconfig", json!([]))
        .with_collection(
            "allsystems",
            json!([
                {"resource_name": "HOSTB", "resource_id": "302"},
                {"resource_name": "HOSTA", "resource_id": 301},
                {"resource_name": "OTHER", "resource_id": 999},
            ]),
        )
        .with_collection(
            "allpatches",
            json!([
                {"patch_id": 10, "patch_description": "Security Cumulative Update for Windows Server 2019", "missing": 2},
                {"patch_id": 11, "patch_description": "Cumulative Update for Windows Server 2022", "missing": 5},
                {"patch_id": 12, "patch_description": "Security Cumulative Update for Windows Server 2022", "missing": 0},
            ]),
        )
        .with_collection(
            "deploymentpolicies",
            json!([
                {"template_name": "Update Workstations", "template_id": 1},
                {"template_name": "Update Servers", "template_id": 7},
            ]),
        )
}

#[tokio::test]
async fn resource_ids_are_a_bounded_stable_subset() {
    let hosts = vec![
        "HOSTA".to_string(),
        "HOSTB".to_string(),
        "UNKNOWN".to_string(),
    ];
    let inventory = json!([
        {"resource_name": "HOSTA", "resource_id": 301},
        {"resource_name": "HOSTB", "resource_id": "302"},
        {"resource_name": "OTHER", "resource_id": 999},
    ]);
    let reversed = json!([
        {"resource_name": "OTHER", "resource_id": 999},
        {"resource_name": "HOSTB", "resource_id": "302"},
        {"resource_name": "HOSTA", "resource_id": 301},
    ]);

    let forward = MockTransport::new().with_collection("allsystems", inventory);
    let backward = MockTransport::new().with_collection("allsystems", reversed);

    let a = resolve::resource_ids(&forward, &hosts).await.unwrap();
    let b = resolve::resource_ids(&backward, &hosts).await.unwrap();

    // Unknown hosts are dropped, not reported; ordering of the inventory
    // does not change the result.
    assert_eq!(a, BTreeSet::from([301, 302]));
    assert_eq!(a, b);
    assert!(a.len() <= hosts.len());
}

#[tokio::test]
async fn existing_config_short_circuits_without_mutating() {
    // Same name prefix and same target *count*, but nothing ties this config
    // to the requested hosts: cardinality-only matching is current behavior.
    let transport = Arc::new(MockTransport::new().with_collection(
        "viewconfig",
        json!([{
            "collection_name": "Automated server updates (copy)",
            "is_collection_deleted": false,
            "total_target_count": 2,
            "status_label": "dc.db.config.status.ready",
        }]),
    ));
    let reconciler = PatchConfigReconciler::new(transport.clone());

    let outcome = reconciler.reconcile(&config_spec()).await.unwrap();

    assert!(!outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(outcome.msg, json!("config already exists"));
    assert!(transport.mutations().is_empty());
}

#[tokio::test]
async fn creation_builds_the_full_installpatch_payload() {
    let transport = Arc::new(creation_fixtures());
    let reconciler = PatchConfigReconciler::new(transport.clone());

    let outcome = reconciler.reconcile(&config_spec()).await.unwrap();

    assert!(outcome.changed);
    assert!(!outcome.failed);

    let mutations = transport.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(
        mutations[0],
        Mutation::Post {
            path: "patch/installpatch".to_string(),
            body: json!({
                "PatchIDs": [10, 11],
                "ResourceIDs": [301, 302],
                "ConfigName": "Automated server updates",
                "ConfigDescription": "Install select patches to devices",
                "actionToPerform": "Deploy",
                "DeploymentPolicyTemplateID": 7,
            }),
        }
    );
}

#[tokio::test]
async fn vendor_code_3010_downgrades_to_no_op() {
    let transport = Arc::new(
        creation_fixtures()
            .with_mutate_response(json!({"status": "error", "error_code": "3010"})),
    );
    let reconciler = PatchConfigReconciler::new(transport);

    let outcome = reconciler.reconcile(&config_spec()).await.unwrap();

    assert!(!outcome.changed);
    assert!(!outcome.failed);
}

#[tokio::test]
async fn other_vendor_codes_fail_terminally() {
    let transport = Arc::new(
        creation_fixtures()
            .with_mutate_response(json!({"status": "error", "error_code": "9002"})),
    );
    let reconciler = PatchConfigReconciler::new(transport);

    let outcome = reconciler.reconcile(&config_spec()).await.unwrap();

    assert!(outcome.failed);
    assert!(!outcome.changed);
}

#[tokio::test]
async fn missing_policy_is_a_terminal_resolution_error() {
    let transport = Arc::new(
        creation_fixtures().with_collection(
            "deploymentpolicies",
            json!([{"template_name": "Update Workstations", "template_id": 1}]),
        ),
    );
    let reconciler = PatchConfigReconciler::new(transport.clone());

    let err = reconciler.reconcile(&config_spec()).await.unwrap_err();

    assert!(matches!(err, Error::PolicyNotFound(name) if name == "Update Servers"));
    assert!(transport.mutations().is_empty());
}

fn open_ticket_fixture() -> Value {
    json!([{
        "id": 77,
        "subject": "Maintenance window 2026-08",
        "status": {"name": "Open"},
        "short_description": "updates for HOSTA, HOSTB : Cumulative Update",
    }])
}

#[tokio::test]
async fn present_ticket_already_open_is_a_no_op() {
    let transport =
        Arc::new(MockTransport::new().with_collection("requests", open_ticket_fixture()));
    let reconciler = TicketReconciler::new(transport.clone());

    let outcome = reconciler
        .reconcile(&ticket_spec(DesiredState::Present))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(outcome.msg, json!("request already exists"));
    assert!(transport.mutations().is_empty());
}

#[tokio::test]
async fn ticket_creation_resolves_the_first_matching_user() {
    let transport = Arc::new(
        MockTransport::new()
            .with_collection("requests", json!([]))
            // Two hits: the first one is accepted without disambiguation.
            .with_collection("users", json!([{"id": "7"}, {"id": 8}]))
            .with_mutate_response(json!({"request": {"status": {"name": "Open"}}})),
    );
    let reconciler = TicketReconciler::new(transport.clone());

    let outcome = reconciler
        .reconcile(&ticket_spec(DesiredState::Present))
        .await
        .unwrap();

    assert!(outcome.changed);
    assert!(!outcome.failed);

    let mutations = transport.mutations();
    assert_eq!(mutations.len(), 1);
    let Mutation::Post { path, body } = &mutations[0] else {
        panic!("expected a POST, got {:?}", mutations[0]);
    };
    assert_eq!(path, "requests");
    assert_eq!(body["request"]["requester"]["id"], 7);
    assert_eq!(body["request"]["subject"], "Maintenance window");
    let description = body["request"]["description"].as_str().unwrap();
    assert!(description.contains("HOSTA"));
    assert!(description.contains("HOSTB"));
    assert!(description.contains("Cumulative Update"));
    assert!(description.contains("{ Update Servers } policy"));
}

#[tokio::test]
async fn unknown_requester_is_a_terminal_resolution_error() {
    let transport = Arc::new(
        MockTransport::new()
            .with_collection("requests", json!([]))
            .with_collection("users", json!([])),
    );
    let reconciler = TicketReconciler::new(transport.clone()).with_requester("nobody");

    let err = reconciler
        .reconcile(&ticket_spec(DesiredState::Present))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UserNotFound(name) if name == "nobody"));
    assert!(transport.mutations().is_empty());
}

#[tokio::test]
async fn absent_ticket_missing_is_a_no_op() {
    let transport = Arc::new(MockTransport::new().with_collection("requests", json!([])));
    let reconciler = TicketReconciler::new(transport.clone());

    let outcome = reconciler
        .reconcile(&ticket_spec(DesiredState::Absent))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(outcome.msg, json!("request does not exist"));
    assert!(transport.mutations().is_empty());
}

#[tokio::test]
async fn absent_ticket_moves_the_match_to_trash() {
    let transport = Arc::new(
        MockTransport::new()
            .with_collection("requests", open_ticket_fixture())
            .with_mutate_response(json!({"response_status": {"status": "success"}})),
    );
    let reconciler = TicketReconciler::new(transport.clone());

    let outcome = reconciler
        .reconcile(&ticket_spec(DesiredState::Absent))
        .await
        .unwrap();

    assert!(outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(
        transport.mutations(),
        vec![Mutation::Delete {
            path: "requests/77/move_to_trash".to_string(),
        }]
    );
}

#[tokio::test]
async fn unexpected_delete_response_shape_fails() {
    let transport = Arc::new(
        MockTransport::new()
            .with_collection("requests", open_ticket_fixture())
            .with_mutate_response(json!({"response_status": {"status": "failed"}})),
    );
    let reconciler = TicketReconciler::new(transport);

    let outcome = reconciler
        .reconcile(&ticket_spec(DesiredState::Absent))
        .await
        .unwrap();

    assert!(outcome.failed);
    assert!(!outcome.changed);
}
