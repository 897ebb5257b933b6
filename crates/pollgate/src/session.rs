//! Per-invocation poll state.

use std::time::Duration;

use futures::future::{BoxFuture, try_join_all};
use tokio::time::Instant;

use crate::error::PollError;
use crate::schedule::{CheckTrigger, ScheduledCheck, deadline_after};

/// State of a single poll invocation.
///
/// Owns the deadline and at most one pending re-check. `resolve` consumes the
/// session, so it settles exactly once and always clears the pending check.
#[derive(Debug)]
pub struct PollSession {
    deadline: Instant,
    interval: Duration,
    prerequisites_satisfied: bool,
    attempts: u32,
    pending: Option<ScheduledCheck>,
}

impl PollSession {
    pub fn start(interval: Duration, timeout: Duration) -> Result<Self, PollError> {
        if interval.is_zero() {
            return Err(PollError::InvalidInterval);
        }

        Ok(Self {
            deadline: deadline_after(timeout),
            interval,
            prerequisites_satisfied: false,
            attempts: 0,
            pending: None,
        })
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of checks made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn prerequisites_satisfied(&self) -> bool {
        self.prerequisites_satisfied
    }

    pub fn has_pending_check(&self) -> bool {
        self.pending.is_some()
    }

    /// The check currently being waited on, if any.
    ///
    /// A wait that is abandoned midway leaves its check pending until the
    /// next wait replaces it or the session resolves.
    pub fn pending_check(&self) -> Option<&ScheduledCheck> {
        self.pending.as_ref()
    }

    /// Run all prerequisites concurrently, bounded by the session deadline.
    ///
    /// The first failure wins and drops the remaining prerequisites.
    pub async fn settle_prerequisites(
        &mut self,
        prerequisites: Vec<BoxFuture<'_, anyhow::Result<()>>>,
    ) -> Result<(), PollError> {
        let count = prerequisites.len();
        match tokio::time::timeout_at(self.deadline, try_join_all(prerequisites)).await {
            Ok(Ok(_)) => {
                tracing::debug!(prerequisites = count, "Prerequisites complete");
                self.prerequisites_satisfied = true;
                Ok(())
            }
            Ok(Err(e)) => Err(PollError::PrerequisiteFailed(e)),
            Err(_) => Err(PollError::Timeout),
        }
    }

    /// Count a check that starts now. Returns whether it started inside the budget.
    pub(crate) fn begin_attempt(&mut self) -> bool {
        self.attempts += 1;
        Instant::now() < self.deadline
    }

    /// Schedule the next check one interval from now and wait for it.
    pub(crate) async fn wait_for_next_check(&mut self) {
        let check = self.pending.insert(ScheduledCheck::after(self.interval));
        // Only `resolve` cancels a pending check, and it consumes the session.
        let trigger = check.wait().await;
        debug_assert_eq!(trigger, CheckTrigger::Fired);
        self.pending = None;
    }

    /// Settle the session with its terminal outcome.
    pub fn resolve(mut self, outcome: Result<(), PollError>) -> Result<(), PollError> {
        if let Some(check) = self.pending.take() {
            check.cancel();
        }

        match &outcome {
            Ok(()) => tracing::debug!(attempts = self.attempts, "Poll session succeeded"),
            Err(PollError::Timeout) => tracing::warn!(
                attempts = self.attempts,
                interval_ms = self.interval.as_millis(),
                "Poll session timed out"
            ),
            Err(e) => tracing::debug!(attempts = self.attempts, error = %e, "Poll session failed"),
        }

        outcome
    }
}
