//! Desired-state declarations supplied by the caller.
//!
//! These are immutable for the duration of one reconciliation; nothing here
//! survives between invocations.

/// Whether the remote object should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Present,
    Absent,
}

/// A patch configuration that should exist on the patch-management backend.
///
/// Only `present` is supported for this resource kind; the backend offers no
/// way to withdraw a configuration through this API.
#[derive(Debug, Clone)]
pub struct PatchConfigSpec {
    pub name: String,
    pub description: String,
    /// Deployment policy, referenced by name and resolved to a template id.
    pub policy_name: String,
    /// Host resource names, usually domain names.
    pub hosts: Vec<String>,
    /// Free-text patch-type labels, matched against the patch catalog by
    /// token subset.
    pub patch_types: Vec<String>,
}

/// A request ticket that should exist (or not) on the service-desk backend.
#[derive(Debug, Clone)]
pub struct TicketSpec {
    pub name: String,
    pub policy_name: Option<String>,
    pub hosts: Vec<String>,
    pub patch_types: Vec<String>,
    pub state: DesiredState,
}
