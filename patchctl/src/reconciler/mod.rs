//! Reconcilers for the two resource kinds.
//!
//! Each reconciler re-reads the relevant remote collection, decides whether
//! an equivalent object already exists, and either reports a no-op or issues
//! one mutating call whose response it classifies. No state survives
//! between invocations.

pub mod patch_config;
pub mod ticket;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Vendor error code meaning "already requested/applied" — an idempotency
/// escape hatch, downgraded to a no-op instead of a failure.
pub const BENIGN_VENDOR_CODE: i64 = 3010;

/// The three-field contract returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub failed: bool,
    pub msg: Value,
}

impl Outcome {
    pub fn unchanged(msg: impl Into<Value>) -> Self {
        Self {
            changed: false,
            failed: false,
            msg: msg.into(),
        }
    }

    pub fn changed(msg: impl Into<Value>) -> Self {
        Self {
            changed: true,
            failed: false,
            msg: msg.into(),
        }
    }

    pub fn failed(msg: impl Into<Value>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: msg.into(),
        }
    }
}

/// Trait for resource reconcilers.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// The desired-state declaration this reconciler accepts.
    type Spec;

    /// Compare desired vs remote state, mutate if needed, classify the
    /// result. `Err` means a terminal engine error (transport, envelope,
    /// resolution); vendor-logical errors come back as `Outcome::failed`.
    async fn reconcile(&self, spec: &Self::Spec) -> Result<Outcome>;
}

/// Classify a creation response.
///
/// The backend reports logical failures inside a 2xx body as
/// `{"status": "error", "error_code": ...}`. Code 3010 is the vendor's own
/// "already satisfied" signal and classifies as an unchanged success; any
/// other code fails. Everything else is a successful creation.
pub fn classify_create(response: Value) -> Outcome {
    let is_error = response.get("status").and_then(Value::as_str) == Some("error");
    if !is_error {
        return Outcome::changed(response);
    }
    if vendor_code_is_benign(response.get("error_code")) {
        Outcome::unchanged(response)
    } else {
        Outcome::failed(response)
    }
}

/// Classify a deletion response, which uses a different shape:
/// `{"response_status": {"status": "success"}}` on success.
pub fn classify_delete(response: Value) -> Outcome {
    let succeeded =
        response.pointer("/response_status/status").and_then(Value::as_str) == Some("success");
    if succeeded {
        Outcome::changed(response)
    } else {
        Outcome::failed(response)
    }
}

// The vendor emits the code as a string; accept a number too.
fn vendor_code_is_benign(code: Option<&Value>) -> bool {
    match code {
        Some(Value::String(s)) => s == &BENIGN_VENDOR_CODE.to_string(),
        Some(Value::Number(n)) => n.as_i64() == Some(BENIGN_VENDOR_CODE),
        _ => false,
    }
}
