// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan targets and their captured traffic

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::har::HarRequest;
use crate::error::Result;

/// A scan subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub attributes: TargetAttributes,
}

/// Target attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAttributes {
    /// Previously captured requests, in capture order. `None` when the
    /// target was never crawled, which is different from an empty capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<Vec<SitemapEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// Create a target without captured traffic
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            name: location.clone(),
            location,
            attributes: TargetAttributes::default(),
        }
    }

    /// Attach captured traffic
    pub fn with_sitemap(mut self, sitemap: Vec<SitemapEntry>) -> Self {
        self.attributes.sitemap = Some(sitemap);
        self
    }

    /// Captured traffic, if any was recorded
    pub fn sitemap(&self) -> Option<&[SitemapEntry]> {
        self.attributes.sitemap.as_deref()
    }
}

/// One captured request, replayable through the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SitemapEntry(pub HarRequest);

impl SitemapEntry {
    /// Serialize into the engine's archive-request wire format
    pub fn to_archive_request(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Request URL
    pub fn url(&self) -> &str {
        &self.0.url
    }
}

impl From<HarRequest> for SitemapEntry {
    fn from(request: HarRequest) -> Self {
        Self(request)
    }
}
