// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan orchestrator

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use super::auth::{AuthenticationSettings, ScanIdentity};
use super::poll::CancelToken;
use super::rate_limit::{RateLimitConfig, RateLimitOverride};
use super::replay::ReplayReport;
use super::session::{Context, Workspace};
use super::spider::{SpiderSettings, DEFAULT_MAX_DEPTH};
use crate::engine::{components, single_value, EngineClient, EngineConfig};
use crate::error::{Error, Result};
use crate::model::{Finding, ReplacerRule, Target};
use crate::replacer::{ApiReplacer, ReplacerConfigurator};

/// Drives one remote engine through session setup, authentication,
/// replay, crawl and active scan.
///
/// The engine holds global state, so full scans are serialized through a
/// single slot. Individual phase methods do not take the slot; callers
/// composing them by hand should hold [`Orchestrator::acquire_slot`].
pub struct Orchestrator {
    pub(crate) engine: EngineClient,
    pub(crate) config: EngineConfig,
    pub(crate) replacer: Arc<dyn ReplacerConfigurator>,
    pub(crate) rate_limits: RateLimitConfig,
    slot: Mutex<()>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine)
            .field("rate_limits", &self.rate_limits)
            .finish()
    }
}

impl Orchestrator {
    /// Connect to the engine and capture its default rate limits
    pub async fn connect(config: EngineConfig) -> Result<Self> {
        let engine = EngineClient::new(&config)?;
        let replacer = Arc::new(ApiReplacer::new(engine.clone()));
        Self::connect_with(engine, config, replacer).await
    }

    /// Connect with a custom replacer configurator
    pub async fn connect_with_replacer(
        config: EngineConfig,
        replacer: Arc<dyn ReplacerConfigurator>,
    ) -> Result<Self> {
        let engine = EngineClient::new(&config)?;
        Self::connect_with(engine, config, replacer).await
    }

    async fn connect_with(
        engine: EngineClient,
        config: EngineConfig,
        replacer: Arc<dyn ReplacerConfigurator>,
    ) -> Result<Self> {
        let rate_limits = RateLimitConfig::capture(&engine).await?;
        info!(
            engine = %engine.base_url(),
            delay_in_ms = rate_limits.delay_in_ms,
            threads_per_host = rate_limits.threads_per_host,
            "Connected to engine"
        );

        Ok(Self::from_parts(engine, config, replacer, rate_limits))
    }

    /// Build without contacting the engine
    pub fn from_parts(
        engine: EngineClient,
        config: EngineConfig,
        replacer: Arc<dyn ReplacerConfigurator>,
        rate_limits: RateLimitConfig,
    ) -> Self {
        Self {
            engine,
            config,
            replacer,
            rate_limits,
            slot: Mutex::new(()),
        }
    }

    /// Use caller-supplied rate-limit defaults instead of reading them
    /// from the engine
    pub fn with_defaults(config: EngineConfig, rate_limits: RateLimitConfig) -> Result<Self> {
        let engine = EngineClient::new(&config)?;
        let replacer = Arc::new(ApiReplacer::new(engine.clone()));
        Ok(Self::from_parts(engine, config, replacer, rate_limits))
    }

    /// Underlying control API client
    pub fn engine(&self) -> &EngineClient {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rate limits captured when connecting
    pub fn rate_limit_defaults(&self) -> RateLimitConfig {
        self.rate_limits
    }

    /// Wait for exclusive use of the engine
    pub async fn acquire_slot(&self) -> MutexGuard<'_, ()> {
        self.slot.lock().await
    }

    /// Engine version string
    pub async fn version(&self) -> Result<String> {
        let doc = self.engine.view(components::CORE, "version", &[]).await?;
        let version = single_value(&doc);
        if version.is_empty() {
            return Err(Error::unexpected("core/view/version", "no version returned"));
        }
        Ok(version)
    }

    /// The engine's own XML report of the current session
    pub async fn raw_report(&self) -> Result<Bytes> {
        self.engine.other(components::CORE, "xmlreport", &[]).await
    }

    /// Run a complete scan for `plan`, holding the scan slot throughout.
    ///
    /// Phases run in order: clear, context, authentication, replay, crawl,
    /// active scan. The first phase error aborts the scan.
    pub async fn run_scan(
        &self,
        plan: &ScanPlan,
        cancel: Option<&CancelToken>,
    ) -> Result<ScanReport> {
        let _slot = self.acquire_slot().await;
        let target_url = plan.target.location.as_str();
        let workspace = Workspace::new();

        info!(target = %target_url, context = workspace.context_name(), "Scan started");

        self.clear_session(&workspace).await?;
        let context = self
            .create_context(&workspace, target_url, &plan.include, &plan.exclude)
            .await?;

        let identity = match &plan.authentication {
            Some(settings) => {
                ScanIdentity::User(self.configure_authentication(&context, settings).await?)
            }
            None => ScanIdentity::Anonymous,
        };

        let replay = self.recall_target(&plan.target, &plan.replacer_rules).await?;
        if replay.sitemap_missing {
            warn!(target = %target_url, "Target has no captured traffic");
        }

        let mut report = ScanReport {
            context,
            identity,
            replay,
            spider_findings: Vec::new(),
            scanner_findings: Vec::new(),
        };

        if plan.spider {
            check_cancelled("Spider", cancel)?;
            let mut settings = SpiderSettings::new(target_url).max_depth(plan.max_depth);
            if let Some(spec) = &plan.api_spec_url {
                settings = settings.api_spec_url(spec.clone());
            }
            let scan_id = self
                .start_spider(&report.context, &settings, &report.identity, &plan.replacer_rules)
                .await?;
            report.spider_findings = self.retrieve_spider_result(&scan_id, cancel).await?;
        }

        if plan.active {
            check_cancelled("Scanner", cancel)?;
            let scan_id = self
                .start_active_scan(
                    &report.context,
                    target_url,
                    &report.identity,
                    &plan.rate_limits,
                    &plan.replacer_rules,
                )
                .await?;
            report.scanner_findings = self
                .retrieve_scanner_result(&scan_id, target_url, cancel)
                .await?;
        }

        info!(
            target = %target_url,
            spider = report.spider_findings.len(),
            scanner = report.scanner_findings.len(),
            "Scan finished"
        );
        Ok(report)
    }
}

fn check_cancelled(operation: &str, cancel: Option<&CancelToken>) -> Result<()> {
    if cancel.map_or(false, CancelToken::is_cancelled) {
        return Err(Error::Cancelled {
            operation: operation.to_string(),
            last_progress: None,
        });
    }
    Ok(())
}

/// Everything one full scan needs
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub target: Target,
    /// Extra in-scope patterns; the target URL is always included
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub authentication: Option<AuthenticationSettings>,
    pub api_spec_url: Option<String>,
    pub max_depth: u32,
    pub replacer_rules: Vec<ReplacerRule>,
    pub rate_limits: RateLimitOverride,
    /// Run the crawl phase
    pub spider: bool,
    /// Run the active-scan phase
    pub active: bool,
}

impl ScanPlan {
    /// Plan that crawls and actively scans `target`
    pub fn new(target: Target) -> Self {
        Self {
            target,
            include: Vec::new(),
            exclude: Vec::new(),
            authentication: None,
            api_spec_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            replacer_rules: Vec::new(),
            rate_limits: RateLimitOverride::none(),
            spider: true,
            active: true,
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn authentication(mut self, settings: AuthenticationSettings) -> Self {
        self.authentication = Some(settings);
        self
    }

    pub fn api_spec_url(mut self, url: impl Into<String>) -> Self {
        self.api_spec_url = Some(url.into());
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn replacer_rule(mut self, rule: ReplacerRule) -> Self {
        self.replacer_rules.push(rule);
        self
    }

    pub fn rate_limits(mut self, limits: RateLimitOverride) -> Self {
        self.rate_limits = limits;
        self
    }

    pub fn spider(mut self, enabled: bool) -> Self {
        self.spider = enabled;
        self
    }

    pub fn active(mut self, enabled: bool) -> Self {
        self.active = enabled;
        self
    }
}

/// Result of [`Orchestrator::run_scan`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub context: Context,
    pub identity: ScanIdentity,
    pub replay: ReplayReport,
    pub spider_findings: Vec<Finding>,
    pub scanner_findings: Vec<Finding>,
}

impl ScanReport {
    /// Every finding, crawl results first
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.spider_findings.iter().chain(self.scanner_findings.iter())
    }
}
