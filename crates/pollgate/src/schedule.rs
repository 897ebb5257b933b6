//! Scheduled re-checks with an explicit cancel handle.
//!
//! A `ScheduledCheck` is the "wait, then check again" step of a poll session.
//! Cancelling it (or dropping it) guarantees it never fires afterwards.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Upper bound for deadlines, about thirty years out.
pub(crate) const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + delay`, clamped to `FAR_FUTURE` so oversized delays cannot overflow the clock.
pub(crate) fn deadline_after(delay: Duration) -> Instant {
    Instant::now() + delay.min(FAR_FUTURE)
}

/// How a scheduled check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// The delay elapsed.
    Fired,
    /// The check was cancelled before it was due.
    Cancelled,
}

#[derive(Debug)]
pub struct ScheduledCheck {
    due: Instant,
    cancel_token: CancellationToken,
}

impl ScheduledCheck {
    /// Delays beyond about thirty years are clamped.
    pub fn after(delay: Duration) -> Self {
        Self::at(deadline_after(delay))
    }

    pub fn at(due: Instant) -> Self {
        Self {
            due,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// A handle that cancels this check when triggered and observes its cancellation.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Wait until the check is due or cancelled, whichever comes first.
    ///
    /// A check cancelled before `wait` is called resolves immediately.
    pub async fn wait(&self) -> CheckTrigger {
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => CheckTrigger::Cancelled,
            _ = tokio::time::sleep_until(self.due) => CheckTrigger::Fired,
        }
    }
}

impl Drop for ScheduledCheck {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
