// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine result documents
//!
//! The control API answers most calls with a single-key object
//! (`{"contextId": "1"}`, `{"status": "100"}`), and lists with an object
//! wrapping an array. Scalars arrive as strings or numbers depending on
//! the engine version, so every scalar field here is read leniently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDocument {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Extract the lone scalar of a single-result document.
///
/// Any other shape yields an empty string.
pub fn single_value(doc: &Value) -> String {
    match doc {
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Parse a single-result document as an integer
pub fn single_integer<T: std::str::FromStr>(operation: &str, doc: &Value) -> Result<T> {
    let raw = single_value(doc);
    raw.trim()
        .parse()
        .map_err(|_| Error::unexpected(operation, format!("expected an integer, got {:?}", raw)))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// One alert raised by the active scanner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub plugin_id: String,
    /// Rule name as reported by older engines
    pub alert: String,
    pub name: String,
    pub risk: String,
    pub confidence: String,
    pub url: String,
    pub method: String,
    pub param: String,
    pub attack: String,
    pub evidence: String,
    pub other: String,
    pub description: String,
    pub solution: String,
    pub reference: String,
    #[serde(rename = "cweid", deserialize_with = "lenient_string")]
    pub cwe_id: String,
    #[serde(rename = "wascid", deserialize_with = "lenient_string")]
    pub wasc_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub message_id: String,
}

impl Alert {
    /// Rule name, whichever field the engine filled
    pub fn rule_name(&self) -> &str {
        if self.name.is_empty() {
            &self.alert
        } else {
            &self.name
        }
    }
}

/// One message the crawler recorded for a scan
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub message_id: String,
    pub url: String,
    pub method: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub processed: String,
}

/// Decode the `alerts` list document
pub fn alerts(doc: &Value) -> Result<Vec<Alert>> {
    match doc.get("alerts") {
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| Error::unexpected("core/view/alerts", e.to_string())),
        None => Err(Error::unexpected("core/view/alerts", "missing alerts list")),
    }
}

/// Flatten the crawl `fullResults` document into its message records.
///
/// The document groups records into sections (in scope, out of scope, I/O
/// errors). Only object entries are message records; out-of-scope URLs
/// arrive as bare strings and are ignored.
pub fn crawl_records(doc: &Value) -> Vec<CrawlRecord> {
    let sections = match doc.get("fullResults").and_then(Value::as_array) {
        Some(sections) => sections,
        None => return Vec::new(),
    };

    sections
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|section| section.values())
        .filter_map(Value::as_array)
        .flatten()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
