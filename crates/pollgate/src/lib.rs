//! pollgate: prerequisite-gated polling for eventually-consistent operations.
//!
//! A poll session runs a set of prerequisite actions to completion, then
//! re-evaluates a condition on a fixed cadence until it holds or the session
//! deadline passes.

mod config;
mod error;
mod poll;
mod schedule;
mod session;

pub use config::{DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT, PollConfig};
pub use error::PollError;
pub use poll::{Poller, Prerequisite, poll, poll_until_done, poll_with_prerequisites};
pub use schedule::{CheckTrigger, ScheduledCheck};
pub use session::PollSession;

/// pollgate version from Cargo.toml
pub const POLLGATE_VERSION: &str = env!("CARGO_PKG_VERSION");
