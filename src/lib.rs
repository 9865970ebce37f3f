// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Haukka - DAST Engine Orchestrator
//!
//! Drives a remote dynamic application security testing engine through a
//! full scan lifecycle over its HTTP control API, and normalizes what it
//! reports into findings.
//!
//! ## Features
//!
//! - Isolated workspaces: unique session and context names per scan
//! - Form-based and CSRF-aware script-based authentication
//! - Forced identity: crawl and scan run as the authenticated user
//! - Replay of previously captured traffic into the engine's history
//! - Crawl and active scan with bounded, cancellable polling
//! - Alert normalization with captured-transaction (HAR) enrichment
//! - Per-scan rate-limit overrides over engine defaults
//! - Health probe
//!
//! ## Example
//!
//! ```rust,no_run
//! use haukka::{EngineConfig, Orchestrator, ScanPlan, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::connect(
//!         EngineConfig::new().api_url("http://127.0.0.1:8080").api_key("changeme"),
//!     )
//!     .await?;
//!
//!     let plan = ScanPlan::new(Target::new("https://example.com")).max_depth(3);
//!     let report = orchestrator.run_scan(&plan, None).await?;
//!
//!     for finding in report.findings() {
//!         println!("{:?} {} {}", finding.severity, finding.name, finding.location);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod health;
pub mod model;
pub mod replacer;
pub mod scan;

// Re-exports for convenience

// Engine
pub use engine::{AuthScript, EngineClient, EngineConfig};

// Errors
pub use error::{Error, Result};

// Health
pub use health::{Status, StatusDetail};

// Model
pub use model::{Finding, Har, HarRequest, Reference, ReplacerRule, Severity, SitemapEntry, Target};

// Replacer
pub use replacer::{ApiReplacer, NoopReplacer, ReplacerConfigurator};

// Scan lifecycle
pub use scan::{
    alert_to_finding, AuthStrategy, AuthenticationSettings, CancelToken, Context, Orchestrator,
    PollOutcome, PollPolicy, RateLimitConfig, RateLimitOverride, ReplayReport, ScanIdentity,
    ScanPlan, ScanReport, SpiderSettings, Workspace,
};

/// Haukka version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
