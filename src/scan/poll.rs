// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Progress polling for remote scan jobs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

use crate::error::{Error, Result};

/// How often to check a job and how long to wait for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between progress checks
    pub interval: Duration,
    /// Give up after this long; `None` waits for as long as the job runs
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Create a policy
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    /// Crawl default: check every second, give up after an hour
    pub fn spider() -> Self {
        Self::new(Duration::from_secs(1), Some(Duration::from_secs(60 * 60)))
    }

    /// Active-scan default: check every five seconds, give up after eight hours
    pub fn scanner() -> Self {
        Self::new(Duration::from_secs(5), Some(Duration::from_secs(8 * 60 * 60)))
    }

    /// Set the interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Cloneable handle that aborts waits on a scan
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { state: Arc::new(tx) }
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives in self, so the channel cannot close under us
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// How a wait on a scan job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Progress reached 100 after `checks` status calls
    Completed { checks: u32 },
    /// The policy timeout elapsed first
    TimedOut { last_progress: Option<u8> },
    /// The cancel token fired first
    Cancelled { last_progress: Option<u8> },
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed { .. })
    }
}

/// Check `progress` until it reports 100.
///
/// Returns as soon as the completing check comes back; sleeps `interval`
/// between checks otherwise. A failed check ends the wait with that error.
pub async fn wait_for_completion<F, Fut>(
    label: &str,
    scan_id: &str,
    policy: &PollPolicy,
    cancel: Option<&CancelToken>,
    mut progress: F,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u8>>,
{
    let started = Instant::now();
    let mut checks = 0u32;
    let mut last_progress = None;

    loop {
        if cancel.map_or(false, CancelToken::is_cancelled) {
            return Ok(PollOutcome::Cancelled { last_progress });
        }

        let current = progress().await?;
        checks += 1;
        last_progress = Some(current);
        info!(scan_id, progress = current, "{} progress: {}%", label, current);

        if current >= 100 {
            info!(scan_id, checks, "{} completed", label);
            return Ok(PollOutcome::Completed { checks });
        }

        if let Some(timeout) = policy.timeout {
            if started.elapsed() >= timeout {
                return Ok(PollOutcome::TimedOut { last_progress });
            }
        }

        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(policy.interval) => {}
                    _ = token.cancelled() => {
                        return Ok(PollOutcome::Cancelled { last_progress });
                    }
                }
            }
            None => tokio::time::sleep(policy.interval).await,
        }
    }
}

/// Turn anything but completion into an error
pub fn require_completed(
    label: &str,
    scan_id: &str,
    policy: &PollPolicy,
    outcome: PollOutcome,
) -> Result<()> {
    let operation = format!("{} {}", label, scan_id);
    match outcome {
        PollOutcome::Completed { .. } => Ok(()),
        PollOutcome::TimedOut { last_progress } => Err(Error::Timeout {
            operation,
            duration_ms: policy.timeout.map_or(0, |t| t.as_millis() as u64),
            last_progress,
        }),
        PollOutcome::Cancelled { last_progress } => Err(Error::Cancelled {
            operation,
            last_progress,
        }),
    }
}
