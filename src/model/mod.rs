// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Data model shared by the orchestrator and its callers

mod finding;
mod har;
mod replacer;
mod target;

pub use finding::{attributes, Finding, Reference, Severity};
pub use har::{Har, HarCookie, HarEntry, HarLog, HarNameValue, HarPostData, HarRequest};
pub use replacer::ReplacerRule;
pub use target::{SitemapEntry, Target, TargetAttributes};
