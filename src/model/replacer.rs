// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Replacer rules

use serde::{Deserialize, Serialize};

/// A declarative request/response mutation applied by the engine.
///
/// Haukka never interprets a rule; it only hands rules to a
/// [`ReplacerConfigurator`](crate::replacer::ReplacerConfigurator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacerRule {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Field to match, e.g. `REQ_HEADER` or `RESP_BODY_STR`
    #[serde(alias = "matchtype")]
    pub match_type: String,
    #[serde(alias = "matchstring")]
    pub match_string: String,
    #[serde(default, alias = "regex")]
    pub match_regex: bool,
    #[serde(default)]
    pub replacement: String,
    /// Comma separated initiator ids; empty means all
    #[serde(default)]
    pub initiators: String,
}

fn enabled() -> bool {
    true
}

impl ReplacerRule {
    /// Create a literal rule
    pub fn new(
        match_type: impl Into<String>,
        match_string: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            description: None,
            enabled: true,
            match_type: match_type.into(),
            match_string: match_string.into(),
            match_regex: false,
            replacement: replacement.into(),
            initiators: String::new(),
        }
    }

    /// Rule that injects or overwrites a request header
    pub fn request_header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new("REQ_HEADER", name, value)
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
