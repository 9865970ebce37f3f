// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Replacer rule configuration
//!
//! Rules are applied before replay, crawl and active scan, and reset
//! between scans. The orchestrator only sees the trait.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::engine::{components, EngineClient};
use crate::error::Result;
use crate::model::ReplacerRule;

/// Applies replacer rules to the engine
#[async_trait]
pub trait ReplacerConfigurator: Send + Sync {
    /// Install `rules`, in order
    async fn configure(&self, rules: &[ReplacerRule]) -> Result<()>;

    /// Remove every rule previously installed
    async fn reset(&self) -> Result<()>;
}

/// Passes rules straight through to the engine's replacer add-on.
///
/// The engine keys rules by description, so a rule already installed under
/// the same description is left alone, and a changed one is replaced.
pub struct ApiReplacer {
    engine: EngineClient,
    installed: Mutex<Vec<(String, ReplacerRule)>>,
}

impl ApiReplacer {
    pub fn new(engine: EngineClient) -> Self {
        Self {
            engine,
            installed: Mutex::new(Vec::new()),
        }
    }

    /// Descriptions of the rules currently installed by this configurator
    pub fn installed(&self) -> Vec<String> {
        self.installed
            .lock()
            .iter()
            .map(|(description, _)| description.clone())
            .collect()
    }

    fn installed_rule(&self, description: &str) -> Option<ReplacerRule> {
        self.installed
            .lock()
            .iter()
            .find(|(d, _)| d == description)
            .map(|(_, rule)| rule.clone())
    }

    async fn add_rule(&self, description: &str, rule: &ReplacerRule) -> Result<()> {
        let enabled = rule.enabled.to_string();
        let regex = rule.match_regex.to_string();

        let mut params = vec![
            ("description", description),
            ("enabled", enabled.as_str()),
            ("matchType", rule.match_type.as_str()),
            ("matchRegex", regex.as_str()),
            ("matchString", rule.match_string.as_str()),
            ("replacement", rule.replacement.as_str()),
        ];
        if !rule.initiators.is_empty() {
            params.push(("initiators", rule.initiators.as_str()));
        }

        self.engine
            .action(components::REPLACER, "addRule", &params)
            .await?;
        Ok(())
    }

    async fn remove_rule(&self, description: &str) -> Result<()> {
        self.engine
            .action(
                components::REPLACER,
                "removeRule",
                &[("description", description)],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ReplacerConfigurator for ApiReplacer {
    async fn configure(&self, rules: &[ReplacerRule]) -> Result<()> {
        for (index, rule) in rules.iter().enumerate() {
            let description = rule
                .description
                .clone()
                .unwrap_or_else(|| format!("haukka-rule-{}", index));

            match self.installed_rule(&description) {
                Some(ref current) if current == rule => {
                    debug!(rule = %description, "Replacer rule already installed");
                    continue;
                }
                Some(_) => {
                    self.remove_rule(&description).await?;
                    self.installed.lock().retain(|(d, _)| d != &description);
                    debug!(rule = %description, "Replacer rule changed, reinstalling");
                }
                None => {}
            }

            self.add_rule(&description, rule).await?;
            debug!(rule = %description, "Replacer rule installed");
            self.installed.lock().push((description, rule.clone()));
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let installed = std::mem::take(&mut *self.installed.lock());
        for (done, (description, _)) in installed.iter().enumerate() {
            if let Err(e) = self.remove_rule(description).await {
                // keep the ones we could not remove for the next reset
                self.installed.lock().extend(installed[done..].iter().cloned());
                return Err(e);
            }
        }
        Ok(())
    }
}

/// For engines without the replacer add-on
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReplacer;

#[async_trait]
impl ReplacerConfigurator for NoopReplacer {
    async fn configure(&self, rules: &[ReplacerRule]) -> Result<()> {
        if !rules.is_empty() {
            debug!(count = rules.len(), "Replacer disabled, ignoring rules");
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        Ok(())
    }
}
