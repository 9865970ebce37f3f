// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine connection and orchestration configuration

use std::time::Duration;

use crate::scan::PollPolicy;

/// Default control API address of a locally running engine
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Name given to the synthetic identity created for authenticated scans
pub const DEFAULT_FORCED_USER: &str = "Testuser";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Control API base URL
    pub api_url: String,
    /// API key, sent on every call when set
    pub api_key: Option<String>,
    /// Per-call timeout for control API round-trips
    pub timeout: Duration,
    /// Polling policy for the crawl phase
    pub spider_poll: PollPolicy,
    /// Polling policy for the active-scan phase
    pub scanner_poll: PollPolicy,
    /// Login script used by script-based authentication
    pub auth_script: AuthScript,
    /// Name of the synthetic forced identity
    pub forced_user: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            spider_poll: PollPolicy::spider(),
            scanner_poll: PollPolicy::scanner(),
            auth_script: AuthScript::default(),
            forced_user: DEFAULT_FORCED_USER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the control API base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the per-call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the crawl polling policy
    pub fn spider_poll(mut self, policy: PollPolicy) -> Self {
        self.spider_poll = policy;
        self
    }

    /// Set the active-scan polling policy
    pub fn scanner_poll(mut self, policy: PollPolicy) -> Self {
        self.scanner_poll = policy;
        self
    }

    /// Set the login script descriptor
    pub fn auth_script(mut self, script: AuthScript) -> Self {
        self.auth_script = script;
        self
    }

    /// Set the forced identity name
    pub fn forced_user(mut self, name: impl Into<String>) -> Self {
        self.forced_user = name.into();
        self
    }
}

/// Login script resource loaded into the engine for CSRF-aware logins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthScript {
    pub name: String,
    pub script_type: String,
    pub script_engine: String,
    pub file_name: String,
    pub description: String,
}

impl Default for AuthScript {
    fn default() -> Self {
        Self {
            name: "csrfAuthScript".to_string(),
            script_type: "authentication".to_string(),
            script_engine: "Oracle Nashorn".to_string(),
            file_name: "csrfAuthScript.js".to_string(),
            description: "csrfloginscript".to_string(),
        }
    }
}
