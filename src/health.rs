// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine health probe

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{components, single_value, EngineClient};
use crate::scan::Orchestrator;

/// Name reported on every status detail
pub const HEALTH_CHECK_NAME: &str = "Engine API";

/// Detail key holding the engine version
pub const VERSION_DETAIL: &str = "version";

/// Health level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Error,
}

/// Result of one health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetail {
    pub name: String,
    pub status: Status,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    pub checked_at: DateTime<Utc>,
}

impl StatusDetail {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            name: HEALTH_CHECK_NAME.to_string(),
            status,
            message: message.into(),
            details: BTreeMap::new(),
            checked_at: Utc::now(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Probe the engine by reading its version. Never fails; problems are
/// reported in the returned detail.
pub async fn status_detail(engine: &EngineClient) -> StatusDetail {
    match engine.view(components::CORE, "version", &[]).await {
        Ok(doc) => {
            let version = single_value(&doc);
            if version.is_empty() {
                warn!("Engine answered without version information");
                StatusDetail::new(
                    Status::Warning,
                    "Engine answered without version information",
                )
            } else {
                let mut detail = StatusDetail::new(Status::Ok, "Engine API is up and running");
                detail.details.insert(VERSION_DETAIL.to_string(), version);
                detail
            }
        }
        Err(e) => {
            warn!(error = %e, "Engine health check failed");
            StatusDetail::new(Status::Error, e.to_string())
        }
    }
}

impl Orchestrator {
    /// Health of the connected engine
    pub async fn status_detail(&self) -> StatusDetail {
        status_detail(&self.engine).await
    }
}
