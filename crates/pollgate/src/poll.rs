//! Polling entry points.
//!
//! Flow of a gated poll:
//! 1. Start the session clock
//! 2. Run every prerequisite concurrently and wait for all of them
//! 3. Check the condition immediately, then once per interval
//! 4. Settle on the first `true`, the first error, or the deadline

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;

use crate::config::PollConfig;
use crate::error::PollError;
use crate::session::PollSession;

/// An action that must finish before the condition is checked.
pub type Prerequisite<'a> = BoxFuture<'a, anyhow::Result<()>>;

/// Check `predicate` every `interval` until it returns `true` or `timeout` elapses.
pub async fn poll<P, Fut>(
    predicate: P,
    interval: Duration,
    timeout: Duration,
) -> Result<(), PollError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    poll_with_prerequisites(Vec::new(), predicate, interval, timeout).await
}

/// Run `prerequisites` to completion, then poll `predicate`.
///
/// The condition is never checked before every prerequisite has succeeded.
/// A failed prerequisite settles the session without any check.
pub async fn poll_with_prerequisites<P, Fut>(
    prerequisites: Vec<Prerequisite<'_>>,
    mut predicate: P,
    interval: Duration,
    timeout: Duration,
) -> Result<(), PollError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let mut session = PollSession::start(interval, timeout)?;

    let outcome = match session.settle_prerequisites(prerequisites).await {
        Ok(()) => check_until_satisfied(&mut session, &mut predicate).await,
        Err(e) => Err(e),
    };

    session.resolve(outcome)
}

async fn check_until_satisfied<P, Fut>(
    session: &mut PollSession,
    predicate: &mut P,
) -> Result<(), PollError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    loop {
        let within_budget = session.begin_attempt();

        if predicate().await.map_err(PollError::PredicateFailed)? {
            return Ok(());
        }

        if !within_budget {
            return Err(PollError::Timeout);
        }

        tracing::debug!(
            attempt = session.attempts(),
            interval_ms = session.interval().as_millis(),
            "Condition not met, checking again"
        );
        session.wait_for_next_check().await;
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Start `action` and check every `interval` whether it has finished.
///
/// Completion is only observed at a check, so the session settles up to one
/// interval after the action ends. A still-running action is aborted when
/// the session times out.
pub async fn poll_until_done<F>(
    action: F,
    interval: Duration,
    timeout: Duration,
) -> Result<(), PollError>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let mut session = PollSession::start(interval, timeout)?;

    let (done_tx, mut done_rx) = oneshot::channel();
    let task = AbortOnDrop(tokio::spawn(async move {
        let _ = done_tx.send(action.await);
    }));

    let outcome = loop {
        let within_budget = session.begin_attempt();

        match done_rx.try_recv() {
            Ok(Ok(())) => break Ok(()),
            Ok(Err(e)) => break Err(PollError::PrerequisiteFailed(e)),
            Err(TryRecvError::Closed) => {
                break Err(PollError::PrerequisiteFailed(anyhow::anyhow!(
                    "action ended without reporting completion"
                )));
            }
            Err(TryRecvError::Empty) => {}
        }

        if !within_budget {
            break Err(PollError::Timeout);
        }

        session.wait_for_next_check().await;
    };

    drop(task);
    session.resolve(outcome)
}

/// Polls with a fixed `PollConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub async fn poll<P, Fut>(&self, predicate: P) -> Result<(), PollError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<bool>>,
    {
        poll(predicate, self.config.interval, self.config.timeout).await
    }

    pub async fn with_prerequisites<P, Fut>(
        &self,
        prerequisites: Vec<Prerequisite<'_>>,
        predicate: P,
    ) -> Result<(), PollError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<bool>>,
    {
        poll_with_prerequisites(
            prerequisites,
            predicate,
            self.config.interval,
            self.config.timeout,
        )
        .await
    }

    pub async fn until_done<F>(&self, action: F) -> Result<(), PollError>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        poll_until_done(action, self.config.interval, self.config.timeout).await
    }
}
