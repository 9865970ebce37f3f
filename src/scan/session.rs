// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine session and scope (context) management

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::Orchestrator;
use crate::engine::{components, single_value};
use crate::error::{Error, Result};

/// Session management method set on every context
pub const COOKIE_SESSION_MANAGEMENT: &str = "cookieBasedSessionManagement";

/// Session and context names for one scan lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    session: String,
    context: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Fresh, collision-free names
    pub fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            session: format!("haukka-session-{}", id),
            context: format!("haukka-context-{}", id),
        }
    }

    /// Use fixed names
    pub fn named(session: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            context: context.into(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session
    }

    pub fn context_name(&self) -> &str {
        &self.context
    }
}

/// Engine-side scope created for a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub name: String,
}

/// Quote `text` so the engine's regex dialect matches it literally.
///
/// Mirrors `\Q...\E` quoting, including the escape for an embedded `\E`.
pub fn quote_literal(text: &str) -> String {
    if !text.contains("\\E") {
        return format!("\\Q{}\\E", text);
    }
    format!("\\Q{}\\E", text.replace("\\E", "\\E\\\\E\\Q"))
}

/// Include pattern covering everything under `url`
pub fn url_prefix_pattern(url: &str) -> String {
    format!("{}.*", quote_literal(url))
}

impl Orchestrator {
    /// Start a fresh session and create a scoped context for `target_url`.
    ///
    /// The target itself is always in scope. Empty include patterns are
    /// skipped; exclude patterns are registered as given. A failure leaves
    /// the engine partially configured; start over with a new session.
    pub async fn create_context(
        &self,
        workspace: &Workspace,
        target_url: &str,
        include: &[String],
        exclude: &[String],
    ) -> Result<Context> {
        info!(
            session = workspace.session_name(),
            context = workspace.context_name(),
            "Creating session and context"
        );

        let target_pattern = url_prefix_pattern(target_url);

        self.new_session(workspace).await?;

        let doc = self
            .engine
            .action(
                components::CONTEXT,
                "newContext",
                &[("contextName", workspace.context_name())],
            )
            .await?;
        let id = single_value(&doc);
        if id.is_empty() {
            return Err(Error::unexpected("context/action/newContext", "no context id returned"));
        }

        for regex in include
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target_pattern.as_str()))
            .filter(|regex| !regex.is_empty())
        {
            debug!(regex, "Including in context");
            self.engine
                .action(
                    components::CONTEXT,
                    "includeInContext",
                    &[("contextName", workspace.context_name()), ("regex", regex)],
                )
                .await?;
        }

        for regex in exclude {
            debug!(regex = %regex, "Excluding from context");
            self.engine
                .action(
                    components::CONTEXT,
                    "excludeFromContext",
                    &[("contextName", workspace.context_name()), ("regex", regex.as_str())],
                )
                .await?;
        }

        self.engine
            .action(
                components::SESSION_MANAGEMENT,
                "setSessionManagementMethod",
                &[("contextId", id.as_str()), ("methodName", COOKIE_SESSION_MANAGEMENT)],
            )
            .await?;

        self.engine
            .action(
                components::HTTP_SESSIONS,
                "createEmptySession",
                &[("site", target_url), ("session", workspace.session_name())],
            )
            .await?;
        self.engine
            .action(
                components::HTTP_SESSIONS,
                "setActiveSession",
                &[("site", target_url), ("session", workspace.session_name())],
            )
            .await?;

        Ok(Context {
            id,
            name: workspace.context_name().to_string(),
        })
    }

    /// Drop all crawl and scan jobs, reset replacer rules and start a
    /// fresh session, so nothing leaks into the next scan.
    pub async fn clear_session(&self, workspace: &Workspace) -> Result<()> {
        info!(session = workspace.session_name(), "Clearing engine session");

        self.engine.action(components::SPIDER, "removeAllScans", &[]).await?;
        self.engine.action(components::ASCAN, "removeAllScans", &[]).await?;
        self.replacer.reset().await?;

        self.new_session(workspace).await
    }

    async fn new_session(&self, workspace: &Workspace) -> Result<()> {
        self.engine
            .action(
                components::CORE,
                "newSession",
                &[("name", workspace.session_name()), ("overwrite", "true")],
            )
            .await?;
        Ok(())
    }
}
