use crate::future::PoolFuture;

/// Errors returned while constructing or tearing down a [`Pool`](crate::pool::Pool).
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// A pool with zero worker threads was requested.
    #[error("thread pool size must be greater than zero")]
    ZeroSized,

    /// Spawning one of the worker threads failed; any threads already spawned
    /// have been joined down before this error is returned.
    #[error("failed to spawn worker thread: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// A `Ctrl+C` handler is already installed for this process.
    #[error("a Ctrl+C handler is already installed for this process")]
    HandlerAlreadyInstalled(#[source] ctrlc::Error),
}

/// Errors returned by [`Pool::submit`](crate::pool::Pool::submit).
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The pool has begun (or finished) shutting down; no new jobs are accepted.
    #[error("cannot submit a task to a pool that is shutting down")]
    ShuttingDown,
}

/// Errors returned by [`PoolFuture::spawn`](crate::future::PoolFuture::spawn).
///
/// The original implementation reports two distinct failure modes from its `async`:
/// "future could not be initialised" (nothing was created) versus "future initialised
/// but submission failed" (the caller must still reclaim the future). Only the second
/// has a reachable counterpart here: a `PoolFuture` is constructed directly as an
/// `Arc`-backed `Mutex`/`Condvar` pair with no fallible step of its own (the global
/// allocator aborts the process on allocation failure rather than returning an error
/// Rust code could recover from), so "created but unusable" is not a state a caller of
/// `&Pool` can ever observe — by the time you hold a `&Pool` its worker threads already
/// exist. The only way `spawn` can fail is the pool rejecting the submission itself.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError<T> {
    /// The future was created but the underlying job could not be submitted (the pool
    /// is shutting down or already shut down). The future is returned so the caller
    /// can reclaim (and drop) it instead of leaking a handle that will never resolve.
    #[error("task future was created but submission to the pool failed")]
    SubmissionFailed(PoolFuture<T>),
}

/// Error raised from [`PoolFuture::wait`](crate::future::PoolFuture::wait) when the
/// job that was supposed to resolve the future panicked instead.
#[derive(Debug, Clone, thiserror::Error)]
#[error("task panicked before resolving its future")]
pub struct TaskPanicked {
    payload: String,
}

impl TaskPanicked {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let payload = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        TaskPanicked { payload }
    }

    /// The panic message, when it could be recovered as a string.
    pub fn message(&self) -> &str {
        &self.payload
    }
}
