// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Captured-transaction (HAR) enrichment
//!
//! Every failure here degrades a single finding, never the scan.

use tracing::warn;

use super::Orchestrator;
use crate::engine::components;
use crate::model::{Har, HarRequest};

impl Orchestrator {
    /// Captured transaction for `message_id`, or `None` if it cannot be
    /// fetched or parsed
    pub async fn get_transaction(&self, message_id: &str) -> Option<Har> {
        let raw = match self
            .engine
            .other(components::CORE, "messageHar", &[("id", message_id)])
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(message_id, error = %e, "Could not fetch transaction from engine");
                return None;
            }
        };

        match serde_json::from_slice::<Har>(&raw) {
            Ok(har) => Some(har),
            Err(e) => {
                warn!(message_id, error = %e, "Could not parse transaction returned by engine");
                None
            }
        }
    }

    /// First recorded request of the transaction for `message_id`
    pub async fn get_request_portion(&self, message_id: &str) -> Option<HarRequest> {
        let har = self.get_transaction(message_id).await?;
        har.first_request().cloned()
    }
}
