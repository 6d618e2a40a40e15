//! Patch-configuration reconciler (patch-management backend, present only).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{classify_create, Outcome, Reconcile};
use crate::desired::PatchConfigSpec;
use crate::error::Result;
use crate::matcher;
use crate::remote::{self, PatchConfigRecord, PatchRecord};
use crate::resolve::{self, ResolvedIdentities};
use crate::select;
use crate::transport::{Mutation, Transport};

/// Reconciler that deploys patch configurations via the `installpatch` call.
pub struct PatchConfigReconciler {
    transport: Arc<dyn Transport>,
}

impl PatchConfigReconciler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn config_exists(&self, spec: &PatchConfigSpec) -> Result<bool> {
        let configs: Vec<PatchConfigRecord> =
            remote::decode(self.transport.fetch_collection("viewconfig", None).await?)?;
        Ok(matcher::patch_config_exists(
            &configs,
            &spec.name,
            spec.hosts.len(),
        ))
    }
}

#[async_trait]
impl Reconcile for PatchConfigReconciler {
    type Spec = PatchConfigSpec;

    async fn reconcile(&self, spec: &Self::Spec) -> Result<Outcome> {
        info!("Reconciling patch config {}", spec.name);

        if self.config_exists(spec).await? {
            debug!("Patch config {} already present", spec.name);
            return Ok(Outcome::unchanged("config already exists"));
        }

        // Resolution order matters: each lookup is an independent call and
        // the payload needs all of them.
        let resource_ids = resolve::resource_ids(self.transport.as_ref(), &spec.hosts).await?;
        let patches: Vec<PatchRecord> =
            remote::decode(self.transport.fetch_collection("allpatches", None).await?)?;
        let patch_ids = select::select_patch_ids(&patches, &spec.patch_types);
        let policy_id = resolve::policy_id(self.transport.as_ref(), &spec.policy_name).await?;

        let identities = ResolvedIdentities {
            resource_ids,
            policy_id,
        };
        info!(
            "Deploying {} patches to {} resources under policy {}",
            patch_ids.len(),
            identities.resource_ids.len(),
            identities.policy_id
        );

        let payload = build_installpatch_payload(spec, &identities, &patch_ids);
        let response = self
            .transport
            .mutate(Mutation::Post {
                path: "patch/installpatch".to_string(),
                body: payload,
            })
            .await?;
        Ok(classify_create(response))
    }
}

/// Build the `installpatch` creation payload; every field is always present.
pub fn build_installpatch_payload(
    spec: &PatchConfigSpec,
    identities: &ResolvedIdentities,
    patch_ids: &std::collections::BTreeSet<i64>,
) -> Value {
    json!({
        "PatchIDs": patch_ids,
        "ResourceIDs": identities.resource_ids,
        "ConfigName": spec.name,
        "ConfigDescription": spec.description,
        "actionToPerform": "Deploy",
        "DeploymentPolicyTemplateID": identities.policy_id,
    })
}
