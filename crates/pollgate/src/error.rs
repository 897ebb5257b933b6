use thiserror::Error;

/// Terminal failure of a poll session.
#[derive(Debug, Error)]
pub enum PollError {
    /// The deadline passed before the condition held.
    #[error("polling time out")]
    Timeout,

    #[error("prerequisite failed: {0:#}")]
    PrerequisiteFailed(anyhow::Error),

    /// The condition check itself failed. Never retried.
    #[error("condition check failed: {0:#}")]
    PredicateFailed(anyhow::Error),

    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Underlying cause for failures raised by caller-supplied work.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            Self::PrerequisiteFailed(e) | Self::PredicateFailed(e) => Some(e),
            Self::Timeout | Self::InvalidInterval => None,
        }
    }
}
