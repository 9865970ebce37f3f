// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan lifecycle
//!
//! Provides:
//! - Session and context setup
//! - Authentication and the forced identity
//! - Replay of captured traffic
//! - Crawl and active-scan phases with bounded polling
//! - Alert normalization into findings

mod active;
mod auth;
mod enrich;
mod orchestrator;
mod poll;
mod rate_limit;
mod replay;
mod session;
mod spider;

pub use active::alert_to_finding;
pub use auth::{
    AuthStrategy, AuthenticationSettings, LoginTemplate, ScanIdentity, FORM_BASED_AUTH,
    SCRIPT_BASED_AUTH,
};
pub use orchestrator::{Orchestrator, ScanPlan, ScanReport};
pub use poll::{require_completed, wait_for_completion, CancelToken, PollOutcome, PollPolicy};
pub use rate_limit::{RateLimitConfig, RateLimitOverride};
pub use replay::{ReplayOutcome, ReplayReport, ReplayStatus};
pub use session::{quote_literal, url_prefix_pattern, Context, Workspace, COOKIE_SESSION_MANAGEMENT};
pub use spider::{SpiderSettings, DEFAULT_MAX_DEPTH};
