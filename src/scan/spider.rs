// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crawl (spider) phase

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth::ScanIdentity;
use super::poll::{require_completed, wait_for_completion, CancelToken, PollOutcome};
use super::session::Context;
use super::Orchestrator;
use crate::engine::response::{crawl_records, single_integer};
use crate::engine::{components, single_value};
use crate::error::{Error, Result};
use crate::model::{attributes, Finding, ReplacerRule};

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Deep-discovery parser switches enabled for every crawl
const DISCOVERY_OPTIONS: &[&str] = &[
    "setOptionParseComments",
    "setOptionParseGit",
    "setOptionParseSVNEntries",
    "setOptionParseSitemapXml",
    "setOptionParseRobotsTxt",
];

/// Crawl parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiderSettings {
    pub target_url: String,
    /// API specification document imported as extra seed content
    #[serde(default)]
    pub api_spec_url: Option<String>,
    pub max_depth: u32,
}

impl SpiderSettings {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            api_spec_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn api_spec_url(mut self, url: impl Into<String>) -> Self {
        self.api_spec_url = Some(url.into());
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Orchestrator {
    /// Configure and launch a crawl. Returns the engine's scan id.
    pub async fn start_spider(
        &self,
        context: &Context,
        settings: &SpiderSettings,
        identity: &ScanIdentity,
        rules: &[ReplacerRule],
    ) -> Result<String> {
        info!(
            target = %settings.target_url,
            api_spec = ?settings.api_spec_url,
            max_depth = settings.max_depth,
            "Starting spider"
        );

        self.replacer.configure(rules).await?;

        if let Some(spec) = settings.api_spec_url.as_deref().filter(|s| !s.is_empty()) {
            self.engine
                .action(components::OPENAPI, "importUrl", &[("url", spec)])
                .await?;
        }

        let depth = settings.max_depth.to_string();
        self.engine
            .action(components::SPIDER, "setOptionMaxDepth", &[("Integer", depth.as_str())])
            .await?;
        for option in DISCOVERY_OPTIONS {
            self.engine
                .action(components::SPIDER, option, &[("Boolean", "true")])
                .await?;
        }

        let (operation, doc) = match identity {
            ScanIdentity::Anonymous => (
                "spider/action/scan",
                self.engine
                    .action(
                        components::SPIDER,
                        "scan",
                        &[
                            ("url", settings.target_url.as_str()),
                            ("maxChildren", "-1"),
                            ("contextName", context.name.as_str()),
                        ],
                    )
                    .await?,
            ),
            ScanIdentity::User(user_id) => (
                "spider/action/scanAsUser",
                self.engine
                    .action(
                        components::SPIDER,
                        "scanAsUser",
                        &[
                            ("contextId", context.id.as_str()),
                            ("userId", user_id.as_str()),
                            ("url", settings.target_url.as_str()),
                            ("maxChildren", "-1"),
                        ],
                    )
                    .await?,
            ),
        };

        let scan_id = single_value(&doc);
        if scan_id.is_empty() {
            return Err(Error::unexpected(operation, "no scan id returned"));
        }
        Ok(scan_id)
    }

    /// Current crawl progress, 0 to 100
    pub async fn spider_progress(&self, scan_id: &str) -> Result<u8> {
        let doc = self
            .engine
            .view(components::SPIDER, "status", &[("scanId", scan_id)])
            .await?;
        single_integer("spider/view/status", &doc)
    }

    /// Wait for a crawl under the configured crawl polling policy
    pub async fn wait_for_spider(
        &self,
        scan_id: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<PollOutcome> {
        wait_for_completion("Spider", scan_id, &self.config.spider_poll, cancel, || {
            self.spider_progress(scan_id)
        })
        .await
    }

    /// Wait for the crawl to finish, then turn every recorded message into
    /// a finding carrying its captured request.
    pub async fn retrieve_spider_result(
        &self,
        scan_id: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Finding>> {
        let outcome = self.wait_for_spider(scan_id, cancel).await?;
        require_completed("Spider", scan_id, &self.config.spider_poll, outcome)?;

        let doc = self
            .engine
            .view(components::SPIDER, "fullResults", &[("scanId", scan_id)])
            .await?;

        let mut findings = Vec::new();
        for record in crawl_records(&doc) {
            let request = if record.message_id.is_empty() {
                None
            } else {
                self.get_request_portion(&record.message_id).await
            };

            let location = request
                .as_ref()
                .map(|r| r.url.clone())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| record.url.clone());
            if location.is_empty() {
                warn!(message_id = %record.message_id, "Crawl record without URL, skipping");
                continue;
            }

            let mut finding = Finding::new(location);
            if let Some(request) = request {
                match serde_json::to_value(&request) {
                    Ok(value) => {
                        finding.attributes.insert(attributes::REQUEST.to_string(), value);
                    }
                    Err(e) => warn!(error = %e, "Could not attach captured request"),
                }
            }
            findings.push(finding);
        }

        info!(scan_id, count = findings.len(), "Found spider URLs");
        Ok(findings)
    }
}
