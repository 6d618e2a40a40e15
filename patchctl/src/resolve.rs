//! Identity resolvers: caller-facing names to backend integer ids.
//!
//! Each resolver is an independent blocking lookup; nothing is cached across
//! invocations.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::remote::{self, PolicyRecord, SystemRecord, UserRecord};
use crate::transport::{Filter, Transport};

/// Identities resolved for a patch-config creation payload.
#[derive(Debug, Clone)]
pub struct ResolvedIdentities {
    pub resource_ids: BTreeSet<i64>,
    pub policy_id: i64,
}

/// Resolve host names to resource ids via the full system inventory.
///
/// Hosts not present in the inventory are silently dropped; callers must
/// treat an undersized result as a possible partial match, not an error.
pub async fn resource_ids(
    transport: &dyn Transport,
    hosts: &[String],
) -> Result<BTreeSet<i64>> {
    let systems: Vec<SystemRecord> =
        remote::decode(transport.fetch_collection("allsystems", None).await?)?;
    let ids: BTreeSet<i64> = systems
        .iter()
        .filter(|s| hosts.iter().any(|h| h == &s.resource_name))
        .map(|s| s.resource_id)
        .collect();
    debug!("Resolved {} of {} hosts to resource ids", ids.len(), hosts.len());
    Ok(ids)
}

/// Resolve a deployment policy name to its template id (first exact match).
pub async fn policy_id(transport: &dyn Transport, policy_name: &str) -> Result<i64> {
    let policies: Vec<PolicyRecord> =
        remote::decode(transport.fetch_collection("deploymentpolicies", None).await?)?;
    policies
        .iter()
        .find(|p| p.template_name == policy_name)
        .map(|p| p.template_id)
        .ok_or_else(|| Error::PolicyNotFound(policy_name.to_string()))
}

/// Resolve a service-desk username to a user id.
///
/// The first search result wins without an ambiguity check; login names are
/// expected to be unique on the backend, but that is not verified here.
pub async fn user_id(transport: &dyn Transport, username: &str) -> Result<i64> {
    let users: Vec<UserRecord> = remote::decode(
        transport
            .fetch_collection(
                "users",
                Some(Filter::Field {
                    field: "name",
                    value: username,
                }),
            )
            .await?,
    )?;
    users
        .first()
        .map(|u| u.id)
        .ok_or_else(|| Error::UserNotFound(username.to_string()))
}
