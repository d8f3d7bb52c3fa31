//! Cancellable operation contexts.
//!
//! Every service call runs inside an [`OperationContext`] minted by
//! [`OperationRegistry::begin`]. The registry tracks only the most recent
//! context: overlapping calls are allowed, but `cancel_current` reaches the
//! latest one only. Each registration is tagged with a monotonically
//! increasing sequence number so a stale guard can never unregister a newer
//! operation's cancel handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RemoteError, ServiceError};

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    current: Option<(u64, CancellationToken)>,
}

/// Registry of the single cancellable in-flight operation.
///
/// The critical sections are id/token swaps only; no I/O ever happens while
/// the lock is held.
#[derive(Default)]
pub struct OperationRegistry {
    inner: Mutex<RegistryState>,
}

impl OperationRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mint a context, register its cancel token as current and return it
    /// together with the guard that releases the registration.
    pub fn begin(
        self: &Arc<Self>,
        global_timeout: Option<Duration>,
    ) -> (OperationContext, OperationGuard) {
        let token = CancellationToken::new();
        let id = {
            let mut st = self.inner.lock();
            st.next_id += 1;
            st.current = Some((st.next_id, token.clone()));
            st.next_id
        };
        debug!(op = id, "operation registered");

        let deadline = global_timeout.map(|t| tokio::time::Instant::now() + t);
        let ctx = OperationContext { token: token.clone(), deadline };
        let guard = OperationGuard {
            registry: Arc::clone(self),
            id,
            token,
            released: false,
        };
        (ctx, guard)
    }

    /// Cancel the current operation, if any. Returns whether there was one.
    ///
    /// Also invoked unconditionally at application shutdown so no network
    /// operation outlives the process.
    pub fn cancel_current(&self) -> bool {
        let taken = self.inner.lock().current.take();
        match taken {
            Some((id, token)) => {
                token.cancel();
                debug!(op = id, "operation cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether some operation is currently registered as cancellable.
    pub fn has_current(&self) -> bool {
        self.inner.lock().current.is_some()
    }
}

/// Cancellable, optionally deadline-bound execution scope for one call.
#[derive(Clone)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<tokio::time::Instant>,
}

impl OperationContext {
    /// Deadline derived from the global timeout, or `None` when unbounded.
    pub fn deadline(&self) -> Option<tokio::time::Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion, racing cancellation and the deadline.
    ///
    /// Cancellation is cooperative: losing the race drops `fut`, which aborts
    /// any request it was awaiting.
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ServiceError>,
    {
        let expired = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = self.token.cancelled() => Err(RemoteError::Cancelled.into()),
            _ = expired => Err(RemoteError::TimedOut.into()),
            res = fut => res.map_err(Into::into),
        }
    }
}

/// Releases one operation's registration.
///
/// Release is idempotent and also runs on drop, so every exit path of a
/// service call clears its registration. The sequence-number check keeps a
/// stale release from clobbering a newer operation that has since begun.
pub struct OperationGuard {
    registry: Arc<OperationRegistry>,
    id: u64,
    token: CancellationToken,
    released: bool,
}

impl OperationGuard {
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.token.cancel();
        let mut st = self.registry.inner.lock();
        if st.current.as_ref().map(|(id, _)| *id) == Some(self.id) {
            st.current = None;
        }
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.release();
    }
}
