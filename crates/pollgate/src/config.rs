//! Poll cadence and budget.

use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);

const INTERVAL_VAR: &str = "POLL_CHECK_INTERVAL_SECS";
const TIMEOUT_VAR: &str = "POLL_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between condition checks.
    pub interval: Duration,
    /// Total budget, measured from the start of the session.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CHECK_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Read `POLL_CHECK_INTERVAL_SECS` and `POLL_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            interval: seconds(&lookup, INTERVAL_VAR).unwrap_or(defaults.interval),
            timeout: seconds(&lookup, TIMEOUT_VAR).unwrap_or(defaults.timeout),
        }
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(
                variable = key,
                value = %raw,
                "Ignoring invalid poll setting, expected a positive number of seconds"
            );
            None
        }
    }
}
