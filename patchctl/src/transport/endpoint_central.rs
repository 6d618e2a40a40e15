//! Transport for the patch-management backend (Endpoint Central).
//!
//! Reads go through the 1.4 API and come back wrapped in a
//! `message_response` envelope keyed by the requested object name; writes go
//! through the 1.3 API. Auth is a bare `Authorization` header carrying the
//! API key, and success is exactly HTTP 200.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Filter, Mutation, Transport, PAGE_LIMIT};
use crate::config::Endpoint;
use crate::error::{Error, Result};

/// Read envelope: `{"message_response": {<object>: [...]}}`.
#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message_response: serde_json::Map<String, Value>,
}

pub struct EndpointCentralTransport {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl EndpointCentralTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn read_url(&self, object: &str, filter: Option<Filter<'_>>) -> String {
        let suffix = match filter {
            Some(Filter::Query(q)) => q,
            // Field search is a service-desk concept; this backend filters
            // through raw query suffixes only.
            _ => "",
        };
        self.endpoint.url(&format!(
            "api/1.4/patch/{object}?=&page=1&pagelimit={PAGE_LIMIT}{suffix}"
        ))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header("Authorization", &self.endpoint.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() != 200 {
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(Into::into)
    }
}

#[async_trait]
impl Transport for EndpointCentralTransport {
    async fn fetch_collection(
        &self,
        object: &str,
        filter: Option<Filter<'_>>,
    ) -> Result<Vec<Value>> {
        let url = self.read_url(object, filter);
        debug!("Fetching {} from {}", object, url);
        let body = self.execute(self.client.get(&url)).await?;
        let envelope: MessageEnvelope = serde_json::from_value(body)?;
        let items = envelope
            .message_response
            .get(object)
            .ok_or_else(|| Error::Envelope(object.to_string()))?;
        serde_json::from_value(items.clone()).map_err(Into::into)
    }

    async fn mutate(&self, mutation: Mutation) -> Result<Value> {
        match mutation {
            Mutation::Post { path, body } => {
                let url = self.endpoint.url(&format!("api/1.3/{path}"));
                debug!("POST {}", url);
                self.execute(self.client.post(&url).json(&body)).await
            }
            Mutation::Delete { path } => {
                let url = self.endpoint.url(&format!("api/1.3/{path}"));
                debug!("DELETE {}", url);
                self.execute(self.client.delete(&url)).await
            }
        }
    }
}
