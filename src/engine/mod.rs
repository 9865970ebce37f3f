// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine control API layer
//!
//! Talks to the remote DAST engine over its HTTP control API. Everything
//! above this layer speaks in components and operations, never in URLs.

mod client;
mod config;
pub mod response;

pub use client::EngineClient;
pub use config::{AuthScript, EngineConfig, DEFAULT_API_URL, DEFAULT_FORCED_USER};
pub use response::{single_value, Alert, CrawlRecord};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-ZAP-API-Key";

/// Control API component names
pub mod components {
    pub const CORE: &str = "core";
    pub const CONTEXT: &str = "context";
    pub const SESSION_MANAGEMENT: &str = "sessionManagement";
    pub const HTTP_SESSIONS: &str = "httpSessions";
    pub const AUTHENTICATION: &str = "authentication";
    pub const USERS: &str = "users";
    pub const FORCED_USER: &str = "forcedUser";
    pub const ACSRF: &str = "acsrf";
    pub const SCRIPT: &str = "script";
    pub const SPIDER: &str = "spider";
    pub const ASCAN: &str = "ascan";
    pub const OPENAPI: &str = "openapi";
    pub const REPLACER: &str = "replacer";
}
