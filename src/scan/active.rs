// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Active-scan phase and alert normalization

use serde_json::Value;
use tracing::{debug, info, warn};

use super::auth::ScanIdentity;
use super::poll::{require_completed, wait_for_completion, CancelToken, PollOutcome};
use super::rate_limit::RateLimitOverride;
use super::session::Context;
use super::Orchestrator;
use crate::engine::response::{alerts, single_integer};
use crate::engine::{components, single_value, Alert};
use crate::error::{Error, Result};
use crate::model::{attributes, Finding, Har, Reference, ReplacerRule};

/// Map one alert onto a finding, attaching `transaction` when present.
///
/// The location is the alert URL, else the transaction's request URL.
/// Returns `None` when neither is known.
pub fn alert_to_finding(alert: &Alert, transaction: Option<&Har>) -> Option<Finding> {
    let location = Some(alert.url.as_str())
        .filter(|url| !url.is_empty())
        .or_else(|| {
            transaction
                .and_then(Har::first_request)
                .map(|request| request.url.as_str())
                .filter(|url| !url.is_empty())
        });
    let location = match location {
        Some(location) => location.to_string(),
        None => {
            warn!(alert_id = %alert.id, rule = alert.rule_name(), "Alert without URL, skipping");
            return None;
        }
    };

    let mut finding = Finding::new(location);
    finding.name = alert.rule_name().to_string();
    finding.category = alert.rule_name().to_string();
    finding.description = alert.description.clone();
    finding.hint = alert.solution.clone();
    finding.severity = match alert.risk.parse() {
        Ok(severity) => Some(severity),
        Err(e) => {
            debug!(alert_id = %alert.id, error = %e, "Alert without known risk level");
            None
        }
    };

    if let Some(har) = transaction {
        match serde_json::to_value(har) {
            Ok(value) => {
                finding.attributes.insert(attributes::HAR.to_string(), value);
            }
            Err(e) => warn!(error = %e, "Could not attach transaction"),
        }
    }

    let references: Vec<Value> = alert
        .reference
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Value::String(line.to_string()))
        .collect();

    finding
        .attributes
        .insert(attributes::OTHER.to_string(), alert.other.clone().into());
    finding
        .attributes
        .insert(attributes::ATTACK.to_string(), alert.attack.clone().into());
    finding
        .attributes
        .insert(attributes::CONFIDENCE.to_string(), alert.confidence.clone().into());
    finding
        .attributes
        .insert(attributes::EVIDENCE.to_string(), alert.evidence.clone().into());
    finding
        .attributes
        .insert(attributes::WASC_ID.to_string(), alert.wasc_id.clone().into());
    finding
        .attributes
        .insert(attributes::PLUGIN_ID.to_string(), alert.plugin_id.clone().into());
    finding
        .attributes
        .insert(attributes::OTHER_REFERENCES.to_string(), Value::Array(references));

    finding.reference = Some(Reference::from_weakness_id(&alert.cwe_id));
    Some(finding)
}

impl Orchestrator {
    /// Configure scan rules and rate limits, then launch an active scan.
    /// Returns the engine's scan id.
    pub async fn start_active_scan(
        &self,
        context: &Context,
        target_url: &str,
        identity: &ScanIdentity,
        rate_limits: &RateLimitOverride,
        rules: &[ReplacerRule],
    ) -> Result<String> {
        info!(target = %target_url, identity = ?identity, "Starting active scan");

        self.engine
            .action(components::ASCAN, "enableAllScanners", &[])
            .await?;
        self.engine
            .action(components::ASCAN, "setOptionHandleAntiCSRFTokens", &[("Boolean", "true")])
            .await?;

        let limits = rate_limits.resolve(&self.rate_limits);
        self.apply_rate_limits(&limits).await?;

        self.replacer.configure(rules).await?;

        let (operation, doc) = match identity {
            ScanIdentity::Anonymous => (
                "ascan/action/scan",
                self.engine
                    .action(
                        components::ASCAN,
                        "scan",
                        &[("url", target_url), ("recurse", "true"), ("inScopeOnly", "false")],
                    )
                    .await?,
            ),
            ScanIdentity::User(user_id) => (
                "ascan/action/scanAsUser",
                self.engine
                    .action(
                        components::ASCAN,
                        "scanAsUser",
                        &[
                            ("url", target_url),
                            ("contextId", context.id.as_str()),
                            ("userId", user_id.as_str()),
                            ("recurse", "true"),
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

    /// Current active-scan progress, 0 to 100
    pub async fn scanner_progress(&self, scan_id: &str) -> Result<u8> {
        let doc = self
            .engine
            .view(components::ASCAN, "status", &[("scanId", scan_id)])
            .await?;
        single_integer("ascan/view/status", &doc)
    }

    /// Wait for an active scan under the configured scan polling policy
    pub async fn wait_for_scanner(
        &self,
        scan_id: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<PollOutcome> {
        wait_for_completion("Scanner", scan_id, &self.config.scanner_poll, cancel, || {
            self.scanner_progress(scan_id)
        })
        .await
    }

    /// Wait for the active scan to finish, then normalize every alert
    /// raised for `target_url`.
    pub async fn retrieve_scanner_result(
        &self,
        scan_id: &str,
        target_url: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Finding>> {
        let outcome = self.wait_for_scanner(scan_id, cancel).await?;
        require_completed("Scanner", scan_id, &self.config.scanner_poll, outcome)?;

        let doc = self
            .engine
            .view(
                components::CORE,
                "alerts",
                &[("baseurl", target_url), ("start", "-1"), ("count", "-1")],
            )
            .await?;
        let alerts = alerts(&doc)?;

        let mut findings = Vec::with_capacity(alerts.len());
        for alert in &alerts {
            let transaction = if alert.message_id.is_empty() {
                None
            } else {
                self.get_transaction(&alert.message_id).await
            };
            findings.extend(alert_to_finding(alert, transaction.as_ref()));
        }

        info!(target = %target_url, alerts = alerts.len(), count = findings.len(), "Found alerts");
        Ok(findings)
    }
}
