use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreResult;

/// Runs jobs after a delay on the ambient tokio runtime. All jobs scheduled
/// before a [`Scheduler::cancel_all`] share one token and die with it.
pub struct Scheduler {
    cancel: Mutex<CancellationToken>,
    pending: Arc<AtomicUsize>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            cancel: Mutex::new(CancellationToken::new()),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The runtime jobs will be spawned on. Fails outside of tokio.
    pub fn runtime() -> CoreResult<Handle> {
        Handle::try_current().map_err(|e| anyhow!("no runtime for deferred jobs: {}", e).into())
    }

    pub fn schedule<F>(&self, runtime: &Handle, delay: Duration, job: F) -> CoreResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.current_token()?;
        let pending = self.pending.clone();
        pending.fetch_add(1, Ordering::SeqCst);

        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => debug!("Deferred job cancelled"),
                _ = tokio::time::sleep(delay) => job(),
            }
            pending.fetch_sub(1, Ordering::SeqCst);
        });
        Ok(())
    }

    /// Cancel every outstanding job. Jobs scheduled afterwards are unaffected.
    pub fn cancel_all(&self) -> CoreResult<()> {
        let mut slot = self
            .cancel
            .lock()
            .map_err(|_| anyhow!("scheduler lock poisoned"))?;
        slot.cancel();
        *slot = CancellationToken::new();
        Ok(())
    }

    /// Jobs that have neither fired nor been cancelled yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn current_token(&self) -> CoreResult<CancellationToken> {
        let slot = self
            .cancel
            .lock()
            .map_err(|_| anyhow!("scheduler lock poisoned"))?;
        Ok(slot.clone())
    }
}
