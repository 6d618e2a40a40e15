//! Typed views of remote objects.
//!
//! Each collection gets a small record struct carrying only the fields the
//! engine reads; everything else the backend returns is ignored. The vendor
//! serializes several numeric fields as JSON strings depending on version, so
//! ids and counts deserialize leniently from either form.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;

/// Decode a fetched collection into typed records.
pub fn decode<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Into::into))
        .collect()
}

/// One entry of the `allsystems` inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemRecord {
    pub resource_name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub resource_id: i64,
}

/// One entry of the `allpatches` catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub patch_id: i64,
    pub patch_description: String,
    /// Number of target hosts still missing this patch.
    #[serde(deserialize_with = "lenient_i64")]
    pub missing: i64,
}

/// One entry of the `deploymentpolicies` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRecord {
    pub template_name: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub template_id: i64,
}

/// One entry of the `viewconfig` collection (existing patch configurations).
#[derive(Debug, Clone, Deserialize)]
pub struct PatchConfigRecord {
    pub collection_name: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_collection_deleted: bool,
    #[serde(deserialize_with = "lenient_i64")]
    pub total_target_count: i64,
    pub status_label: String,
}

/// Status sub-object of a service-desk request.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketStatus {
    pub name: String,
}

/// One entry of the service-desk `requests` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRecord {
    /// Kept as a string; it only ever feeds back into a URL path segment.
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub subject: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub short_description: String,
}

/// One entry of a service-desk `users` search result.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Num(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Num(i64),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Flag(b) => b,
        Raw::Num(n) => n != 0,
        Raw::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}
