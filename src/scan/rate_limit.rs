// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Active-scan throughput limits

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Orchestrator;
use crate::engine::response::single_integer;
use crate::engine::{components, EngineClient};
use crate::error::Result;

/// Delay between requests and per-host concurrency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub delay_in_ms: u32,
    pub threads_per_host: u32,
}

impl RateLimitConfig {
    pub fn new(delay_in_ms: u32, threads_per_host: u32) -> Self {
        Self {
            delay_in_ms,
            threads_per_host,
        }
    }

    /// Read the engine's current settings
    pub async fn capture(engine: &EngineClient) -> Result<Self> {
        let delay = engine.view(components::ASCAN, "optionDelayInMs", &[]).await?;
        let threads = engine.view(components::ASCAN, "optionThreadPerHost", &[]).await?;

        let captured = Self {
            delay_in_ms: single_integer("ascan/view/optionDelayInMs", &delay)?,
            threads_per_host: single_integer("ascan/view/optionThreadPerHost", &threads)?,
        };
        debug!(
            delay_in_ms = captured.delay_in_ms,
            threads_per_host = captured.threads_per_host,
            "Captured default rate limits"
        );
        Ok(captured)
    }
}

/// Per-scan override; unset fields fall back to the captured default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitOverride {
    #[serde(default)]
    pub delay_in_ms: Option<u32>,
    #[serde(default)]
    pub threads_per_host: Option<u32>,
}

impl RateLimitOverride {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn delay_in_ms(mut self, delay: u32) -> Self {
        self.delay_in_ms = Some(delay);
        self
    }

    pub fn threads_per_host(mut self, threads: u32) -> Self {
        self.threads_per_host = Some(threads);
        self
    }

    /// Effective limits for one scan
    pub fn resolve(&self, defaults: &RateLimitConfig) -> RateLimitConfig {
        RateLimitConfig {
            delay_in_ms: self.delay_in_ms.unwrap_or(defaults.delay_in_ms),
            threads_per_host: self.threads_per_host.unwrap_or(defaults.threads_per_host),
        }
    }
}

impl Orchestrator {
    pub(crate) async fn apply_rate_limits(&self, limits: &RateLimitConfig) -> Result<()> {
        debug!(
            delay_in_ms = limits.delay_in_ms,
            threads_per_host = limits.threads_per_host,
            "Setting scan rate limits"
        );
        let delay = limits.delay_in_ms.to_string();
        let threads = limits.threads_per_host.to_string();

        self.engine
            .action(components::ASCAN, "setOptionDelayInMs", &[("Integer", delay.as_str())])
            .await?;
        self.engine
            .action(components::ASCAN, "setOptionThreadPerHost", &[("Integer", threads.as_str())])
            .await?;
        Ok(())
    }
}
