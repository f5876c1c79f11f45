//! Serialized blocking calls on tokio's blocking pool.
//!
//! A blocking task keeps running after the future awaiting it is dropped
//! (e.g. by a navigation timeout). [`BlockingSlot`] remembers such a task and
//! waits for it before starting the next one, so calls against one resource
//! never overlap.

use nsrecords_shared::{NsRecordsError, Result};
use tokio::task::JoinHandle;
use tracing::debug;

/// At most one blocking call in flight.
#[derive(Debug)]
pub(crate) struct BlockingSlot<T> {
    pending: Option<JoinHandle<Result<T>>>,
}

impl<T: Send + 'static> BlockingSlot<T> {
    pub(crate) fn new() -> Self {
        Self { pending: None }
    }

    /// Whether an earlier call was abandoned and may still be running.
    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for an abandoned call, discarding its outcome.
    pub(crate) async fn drain(&mut self) {
        if let Some(handle) = self.pending.as_mut() {
            debug!("waiting for abandoned blocking call");
            let outcome = handle.await;
            self.pending = None;
            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!(error = %e, "abandoned call failed"),
                Err(e) => debug!(error = %e, "abandoned call panicked"),
            }
        }
    }

    /// Run `f` on the blocking pool once any earlier call has finished.
    ///
    /// If the returned future is dropped early, the task stays recorded and
    /// the next `run` or `drain` waits for it.
    pub(crate) async fn run<F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.drain().await;

        let handle = self.pending.insert(tokio::task::spawn_blocking(f));
        let joined = handle.await;
        self.pending = None;

        joined.map_err(|e| NsRecordsError::Network(format!("blocking task failed: {e}")))?
    }
}
