//! Transport for the service-desk backend (ServiceDesk Plus).
//!
//! The v3 API takes an `authtoken` header, accepts 200 or 201 as success,
//! and carries its read parameters in an `input_data` JSON blob: a query
//! parameter for GETs and a form field for POSTs. Collections come back
//! keyed by the object name at the top level of the body.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{Filter, Mutation, Transport, PAGE_LIMIT};
use crate::config::Endpoint;
use crate::error::{Error, Result};

/// Field-search reads are bounded tighter than plain collection reads.
const SEARCH_ROW_COUNT: u32 = 100;

/// Fields requested alongside a user search.
const USER_SEARCH_FIELDS: [&str; 16] = [
    "name",
    "is_technician",
    "citype",
    "login_name",
    "email_id",
    "department",
    "phone",
    "mobile",
    "jobtitle",
    "project_roles",
    "employee_id",
    "first_name",
    "middle_name",
    "last_name",
    "is_vipuser",
    "ciid",
];

pub struct ServiceDeskTransport {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl ServiceDeskTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn input_data(filter: Option<Filter<'_>>) -> Value {
        match filter {
            Some(Filter::Field { field, value }) => json!({
                "list_info": {
                    "start_index": 1,
                    "sort_field": "name",
                    "sort_order": "asc",
                    "row_count": SEARCH_ROW_COUNT,
                    "get_total_count": true,
                    "search_fields": { field: value },
                },
                "fields_required": USER_SEARCH_FIELDS,
            }),
            // Raw query suffixes are a patch-management concept; plain reads
            // get the default single-page listing.
            _ => json!({
                "list_info": { "row_count": PAGE_LIMIT, "sort_order": "desc" }
            }),
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header("authtoken", &self.endpoint.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !matches!(status.as_u16(), 200 | 201) {
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(Into::into)
    }
}

#[async_trait]
impl Transport for ServiceDeskTransport {
    async fn fetch_collection(
        &self,
        object: &str,
        filter: Option<Filter<'_>>,
    ) -> Result<Vec<Value>> {
        let url = self.endpoint.url(&format!("api/v3/{object}"));
        debug!("Fetching {} from {}", object, url);
        let params = Self::input_data(filter);
        let body = self
            .execute(
                self.client
                    .get(&url)
                    .query(&[("input_data", params.to_string())]),
            )
            .await?;
        let items = body
            .get(object)
            .ok_or_else(|| Error::Envelope(object.to_string()))?;
        serde_json::from_value(items.clone()).map_err(Into::into)
    }

    async fn mutate(&self, mutation: Mutation) -> Result<Value> {
        match mutation {
            Mutation::Post { path, body } => {
                let url = self.endpoint.url(&format!("api/v3/{path}"));
                debug!("POST {}", url);
                // Writes carry the payload as a form field, not a JSON body.
                self.execute(
                    self.client
                        .post(&url)
                        .form(&[("input_data", body.to_string())]),
                )
                .await
            }
            Mutation::Delete { path } => {
                let url = self.endpoint.url(&format!("api/v3/{path}"));
                debug!("DELETE {}", url);
                self.execute(self.client.delete(&url)).await
            }
        }
    }
}
