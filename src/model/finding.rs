// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Normalized findings

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Attribute keys used on findings
pub mod attributes {
    /// Captured request of a crawled message
    pub const REQUEST: &str = "request";
    /// Full captured transaction of an alert's message
    pub const HAR: &str = "HAR";
    pub const OTHER: &str = "OTHER";
    pub const ATTACK: &str = "ATTACK";
    pub const CONFIDENCE: &str = "CONFIDENCE";
    pub const EVIDENCE: &str = "EVIDENCE";
    pub const WASC_ID: &str = "WASC_ID";
    pub const PLUGIN_ID: &str = "PLUGIN_ID";
    pub const OTHER_REFERENCES: &str = "OTHER_REFERENCES";
}

/// One crawled request or one discovered issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl Finding {
    /// Create a finding at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            location: location.into(),
            severity: None,
            description: String::new(),
            hint: String::new(),
            category: String::new(),
            reference: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute
    pub fn get_attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Severity, from the engine's risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Informational,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Informational => "Informational",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "informational" | "info" => Ok(Severity::Informational),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown risk label: {}", other)),
        }
    }
}

/// External reference attached to a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub source: String,
}

impl Reference {
    /// Build the reference for a weakness-classification id.
    ///
    /// The identifier is `CVE-` followed by the weakness id even though
    /// the two are different namespaces; downstream consumers key on this
    /// exact form.
    pub fn from_weakness_id(cwe_id: &str) -> Self {
        Self {
            id: format!("CVE-{}", cwe_id),
            source: format!("https://cwe.mitre.org/data/definitions/{}.html", cwe_id),
        }
    }
}
