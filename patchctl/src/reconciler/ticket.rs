//! Service-desk request-ticket reconciler (present and absent).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{classify_create, classify_delete, Outcome, Reconcile};
use crate::desired::{DesiredState, TicketSpec};
use crate::error::{Error, Result};
use crate::matcher;
use crate::remote::{self, TicketRecord};
use crate::resolve;
use crate::transport::{Mutation, Transport};

/// Account searched for when resolving the ticket requester.
pub const DEFAULT_REQUESTER_USERNAME: &str = "sv-automation";

/// Display name attached to the requester on created tickets.
const REQUESTER_DISPLAY_NAME: &str = "automation";

/// Reconciler that manages service-desk request tickets.
pub struct TicketReconciler {
    transport: Arc<dyn Transport>,
    requester_username: String,
}

impl TicketReconciler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            requester_username: DEFAULT_REQUESTER_USERNAME.to_string(),
        }
    }

    /// Override the account used as ticket requester.
    pub fn with_requester(mut self, username: impl Into<String>) -> Self {
        self.requester_username = username.into();
        self
    }

    async fn find_existing(&self, spec: &TicketSpec) -> Result<Option<TicketRecord>> {
        let tickets: Vec<TicketRecord> =
            remote::decode(self.transport.fetch_collection("requests", None).await?)?;
        Ok(
            matcher::find_ticket(&tickets, &spec.name, &spec.hosts, &spec.patch_types)
                .cloned(),
        )
    }

    async fn create(&self, spec: &TicketSpec) -> Result<Outcome> {
        let requester_id =
            resolve::user_id(self.transport.as_ref(), &self.requester_username).await?;
        debug!(
            "Creating ticket {} as requester {} ({})",
            spec.name, self.requester_username, requester_id
        );
        let response = self
            .transport
            .mutate(Mutation::Post {
                path: "requests".to_string(),
                body: build_request_payload(spec, requester_id),
            })
            .await?;
        // The create response nests the ticket under a `request` key.
        let request = response
            .get("request")
            .cloned()
            .ok_or_else(|| Error::Envelope("request".to_string()))?;
        Ok(classify_create(request))
    }

    async fn delete(&self, ticket: &TicketRecord) -> Result<Outcome> {
        info!("Moving ticket {} to trash", ticket.id);
        let response = self
            .transport
            .mutate(Mutation::Delete {
                path: format!("requests/{}/move_to_trash", ticket.id),
            })
            .await?;
        Ok(classify_delete(response))
    }
}

#[async_trait]
impl Reconcile for TicketReconciler {
    type Spec = TicketSpec;

    async fn reconcile(&self, spec: &Self::Spec) -> Result<Outcome> {
        info!("Reconciling ticket {} ({:?})", spec.name, spec.state);
        let existing = self.find_existing(spec).await?;

        match (spec.state, existing) {
            (DesiredState::Present, Some(ticket)) => {
                debug!("Ticket already open as request {}", ticket.id);
                Ok(Outcome::unchanged("request already exists"))
            }
            (DesiredState::Present, None) => self.create(spec).await,
            (DesiredState::Absent, None) => Ok(Outcome::unchanged("request does not exist")),
            (DesiredState::Absent, Some(ticket)) => self.delete(&ticket).await,
        }
    }
}

/// Build the ticket creation payload nested under `request`.
pub fn build_request_payload(spec: &TicketSpec, requester_id: i64) -> Value {
    json!({
        "request": {
            "subject": spec.name,
            "description": describe(spec),
            "requester": { "id": requester_id, "name": REQUESTER_DISPLAY_NAME },
            "resolution": { "content": "The update has completed successfully" },
            "status": { "name": "Open" },
        }
    })
}

// The generated description must name every host and patch type so that the
// existence matcher can find the ticket again on the next run.
fn describe(spec: &TicketSpec) -> String {
    let policy_clause = spec
        .policy_name
        .as_deref()
        .map(|p| format!(" in accordance with the {{ {p} }} policy"))
        .unwrap_or_default();
    format!(
        "[AUTO-GENERATED] patchctl has initiated {} updates for the following servers : {}{}",
        spec.patch_types.join(", "),
        spec.hosts.join(", "),
        policy_clause
    )
}
