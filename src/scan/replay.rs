// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Replay of captured traffic into the engine's history

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::Orchestrator;
use crate::engine::components;
use crate::error::Result;
use crate::model::{ReplacerRule, Target};

/// What happened to one captured request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReplayStatus {
    Submitted,
    Skipped { reason: String },
}

/// Replay result for one sitemap entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayOutcome {
    pub index: usize,
    pub url: String,
    #[serde(flatten)]
    pub status: ReplayStatus,
}

/// Result of replaying a target's captured traffic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// The target carried no captured traffic at all
    pub sitemap_missing: bool,
    pub outcomes: Vec<ReplayOutcome>,
}

impl ReplayReport {
    pub fn submitted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ReplayStatus::Submitted)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.submitted()
    }
}

impl Orchestrator {
    /// Resubmit the target's captured requests through the engine so they
    /// land in its history.
    ///
    /// Entries are independent: one that fails to serialize or submit is
    /// recorded as skipped and the rest still go out. Only a failure to
    /// apply the replacer rules is returned as an error.
    pub async fn recall_target(
        &self,
        target: &Target,
        rules: &[ReplacerRule],
    ) -> Result<ReplayReport> {
        let sitemap = match target.sitemap() {
            Some(sitemap) => sitemap,
            None => {
                warn!(
                    target = %target.location,
                    "No captured requests to recall; the scan will have nothing to act on"
                );
                return Ok(ReplayReport {
                    sitemap_missing: true,
                    outcomes: Vec::new(),
                });
            }
        };

        self.replacer.configure(rules).await?;

        info!(count = sitemap.len(), "Recalling captured requests");
        let mut outcomes = Vec::with_capacity(sitemap.len());

        for (index, entry) in sitemap.iter().enumerate() {
            let status = match entry.to_archive_request() {
                Err(e) => {
                    error!(index, error = %e, "Could not serialize captured request");
                    ReplayStatus::Skipped {
                        reason: format!("serialization failed: {}", e),
                    }
                }
                Ok(wire) => match self
                    .engine
                    .other_form(
                        components::CORE,
                        "sendHarRequest",
                        &[("request", wire.as_str()), ("followRedirects", "false")],
                    )
                    .await
                {
                    Ok(response) => {
                        debug!(
                            index,
                            response = %String::from_utf8_lossy(&response),
                            "Recalled captured request"
                        );
                        ReplayStatus::Submitted
                    }
                    Err(e) => {
                        error!(index, url = %entry.url(), error = %e, "Could not submit captured request");
                        ReplayStatus::Skipped {
                            reason: format!("submission failed: {}", e),
                        }
                    }
                },
            };

            outcomes.push(ReplayOutcome {
                index,
                url: entry.url().to_string(),
                status,
            });
        }

        let report = ReplayReport {
            sitemap_missing: false,
            outcomes,
        };
        info!(
            submitted = report.submitted(),
            skipped = report.skipped(),
            "Recall finished"
        );
        Ok(report)
    }
}
