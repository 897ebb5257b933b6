use pollgate::PollError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    /// The remote state cannot be reconciled automatically.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The service reported back something other than what was uploaded.
    #[error("verification mismatch: {0}")]
    VerificationMismatch(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path}")]
    Asset {
        path: String,
        source: std::io::Error,
    },

    #[error("DNS request failed: {0}")]
    Dns(String),

    #[error("identity provider request failed: {0}")]
    Identity(String),

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl HookError {
    /// The hook error that made a poll session fail, if the cause was one.
    pub fn hook_cause(&self) -> Option<&HookError> {
        match self {
            Self::Poll(poll) => poll.cause().and_then(|e| e.downcast_ref::<HookError>()),
            _ => None,
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        match self {
            Self::InvalidState(_) => true,
            other => matches!(other.hook_cause(), Some(Self::InvalidState(_))),
        }
    }

    pub fn is_verification_mismatch(&self) -> bool {
        match self {
            Self::VerificationMismatch(_) => true,
            other => matches!(other.hook_cause(), Some(Self::VerificationMismatch(_))),
        }
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
