//! Grace policy for "was this upload actually stored just now?".
//!
//! The identity provider reports when the UI customization was last modified.
//! A timestamp close to the upload means our write landed; an old one means the
//! service kept a previous customization.

use std::time::Duration;

use chrono::{DateTime, Utc};

pub const DEFAULT_WARN_AFTER: Duration = Duration::from_secs(1);
pub const DEFAULT_FAIL_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Older than this is reported as a warning.
    pub warn_after: Duration,
    /// Older than this fails verification.
    pub fail_after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(Duration),
    Expired(Duration),
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            warn_after: DEFAULT_WARN_AFTER,
            fail_after: DEFAULT_FAIL_AFTER,
        }
    }
}

impl FreshnessPolicy {
    pub fn classify(&self, last_modified: DateTime<Utc>, now: DateTime<Utc>) -> Freshness {
        // A timestamp ahead of our clock is skew, not age.
        let elapsed = (now - last_modified).to_std().unwrap_or(Duration::ZERO);

        if elapsed > self.fail_after {
            Freshness::Expired(elapsed)
        } else if elapsed > self.warn_after {
            Freshness::Stale(elapsed)
        } else {
            Freshness::Fresh
        }
    }
}
