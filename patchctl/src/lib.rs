//! patchctl: desired-state reconciliation for ManageEngine backends.
//!
//! This library reconciles declarations like "a patch configuration should
//! exist targeting these hosts with these patch types" (Endpoint Central) and
//! "a request ticket should exist / not exist for this deployment"
//! (ServiceDesk Plus) against the live state of the remote APIs. The remote
//! side is the single source of truth: every reconciliation re-reads the
//! relevant collection before deciding whether to mutate anything.

pub mod config;
pub mod desired;
pub mod error;
pub mod matcher;
pub mod reconciler;
pub mod remote;
pub mod resolve;
pub mod select;
pub mod transport;

// Re-export commonly used types at crate root
pub use config::Endpoint;
pub use desired::{DesiredState, PatchConfigSpec, TicketSpec};
pub use error::{Error, Result};
pub use reconciler::patch_config::PatchConfigReconciler;
pub use reconciler::ticket::TicketReconciler;
pub use reconciler::{Outcome, Reconcile};
pub use transport::{EndpointCentralTransport, Filter, Mutation, ServiceDeskTransport, Transport};
