//! Backend transports.
//!
//! The two backends look superficially alike but differ in auth header,
//! success-status set, version paths, and envelope shape, so each gets its
//! own transport behind one narrow trait rather than a parameterized client.

mod endpoint_central;
mod service_desk;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use endpoint_central::EndpointCentralTransport;
pub use service_desk::ServiceDeskTransport;

/// Single-page bound for collection reads; larger collections silently
/// truncate.
pub const PAGE_LIMIT: u32 = 1000;

/// Optional narrowing of a collection read.
#[derive(Debug, Clone, Copy)]
pub enum Filter<'a> {
    /// Raw query-string suffix appended to the read URL (patch-management
    /// backend).
    Query(&'a str),
    /// Search on a named field (service-desk `search_fields`).
    Field { field: &'a str, value: &'a str },
}

/// A state-changing call against a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// POST `body` to the versioned `path`.
    Post { path: String, body: Value },
    /// DELETE the versioned `path`.
    Delete { path: String },
}

/// Narrow interface the reconcilers talk through.
///
/// `fetch_collection` returns one bounded page (≤ [`PAGE_LIMIT`] items) of
/// the named remote collection, already unwrapped from its envelope.
/// `mutate` executes a state-changing call and returns the decoded response
/// body whole; vendor-logical errors embedded in a 2xx body are left for the
/// reconciler to classify.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_collection(
        &self,
        object: &str,
        filter: Option<Filter<'_>>,
    ) -> Result<Vec<Value>>;

    async fn mutate(&self, mutation: Mutation) -> Result<Value>;
}
