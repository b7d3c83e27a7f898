use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::{SpawnError, TaskPanicked};
use crate::pool::Pool;

/// A single-assignment result cell produced by [`Pool::spawn`], with support for
/// chaining further work via [`map`](PoolFuture::map).
///
/// This is the future/promise layer from the original implementation's `future_t`,
/// redesigned around one tagged [`Slot`] instead of the original's separate
/// `initiated`/`resolved` integer pair: a `PoolFuture` is always at least `Pending`
/// from the moment it exists, so there is no reachable "uninitialised" state for
/// `map` to (mis-)handle — see `DESIGN.md` for the original bug this sidesteps.
///
/// Cloning a `PoolFuture` is cheap and gives you another handle to the same result —
/// the equivalent of two threads dereferencing the same result pointer in the
/// original implementation.
pub struct PoolFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PoolFuture<T> {
    fn clone(&self) -> Self {
        PoolFuture {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for PoolFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolFuture").finish_non_exhaustive()
    }
}

struct Shared<T> {
    state: Mutex<Slot<T>>,
    ready: Condvar,
}

enum Slot<T> {
    Pending { continuations: Vec<Continuation<T>> },
    Resolved(Outcome<T>),
}

enum Outcome<T> {
    Ready(Arc<T>),
    Panicked(TaskPanicked),
}

impl<T> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Ready(value) => Outcome::Ready(value.clone()),
            Outcome::Panicked(err) => Outcome::Panicked(err.clone()),
        }
    }
}

/// A chain callback registered on an upstream future: the pool it will be
/// re-submitted to, plus the thunk to run once the upstream outcome is known.
///
/// Bundling the pool alongside the thunk mirrors the original's `callback_t`, which
/// carries its own `thread_pool_t *pool` for exactly this purpose.
struct Continuation<T> {
    pool: Pool,
    run: Box<dyn FnOnce(Outcome<T>) + Send>,
}

impl<T: Send + 'static> PoolFuture<T> {
    /// Creates a `Pending` future and submits a job to `pool` that will resolve it
    /// by running `f`.
    ///
    /// Returns [`SpawnError::SubmissionFailed`] (handing the orphaned future back) if
    /// the pool rejected the submission because it is shutting down. There is no
    /// separate "future could not be initialised" error: see the note on
    /// [`SpawnError`](crate::error::SpawnError) for why that original failure mode
    /// has no reachable counterpart in this design.
    pub fn spawn<F>(pool: &Pool, f: F) -> Result<PoolFuture<T>, SpawnError<T>>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let future = PoolFuture::pending();
        let resolver = future.clone();
        let submitted = pool.submit(move || {
            let outcome = run_catching(f);
            resolver.resolve(outcome);
        });

        match submitted {
            Ok(()) => Ok(future),
            Err(_) => Err(SpawnError::SubmissionFailed(future)),
        }
    }

    /// Schedules `f` to run on this future's result once it is available, returning
    /// a new future for `f`'s output.
    ///
    /// If this future is already resolved, `f` is immediately submitted to `pool` as
    /// a fresh job. Otherwise it is appended to this future's continuation list and
    /// is re-submitted to `pool` by the worker that resolves this future — never run
    /// inline on that worker, so chains of arbitrary length do not grow any one
    /// thread's stack.
    ///
    /// Because a `PoolFuture` can never be observed in an uninitialised state (see
    /// the type-level note on [`PoolFuture`]), there is no "map on an uninitialised
    /// future" error to report here, unlike the original `map`.
    pub fn map<U, F>(&self, pool: &Pool, f: F) -> PoolFuture<U>
    where
        U: Send + 'static,
        F: FnOnce(&T) -> U + Send + 'static,
    {
        let downstream = PoolFuture::pending();
        let resolver = downstream.clone();
        let run: Box<dyn FnOnce(Outcome<T>) + Send> = Box::new(move |outcome| match outcome {
            Outcome::Ready(value) => {
                let mapped = run_catching(move || f(&value));
                resolver.resolve(mapped);
            }
            Outcome::Panicked(err) => resolver.resolve(Outcome::Panicked(err)),
        });

        let mut state = self.shared.state.lock().unwrap();
        match &mut *state {
            Slot::Pending { continuations } => {
                continuations.push(Continuation {
                    pool: pool.clone(),
                    run,
                });
            }
            Slot::Resolved(outcome) => {
                let outcome = outcome.clone();
                let pool = pool.clone();
                drop(state);
                if pool.submit(move || run(outcome)).is_err() {
                    tracing::warn!("failed to submit map callback to a shutting-down pool");
                }
                return downstream;
            }
        }
        downstream
    }

    /// Blocks the calling thread until this future resolves, then returns an `Arc`
    /// to the result.
    ///
    /// Multiple threads may call `wait` on clones of the same future concurrently;
    /// all observe the same underlying value (the same `Arc` pointee), matching the
    /// original's guarantee that concurrent `await` calls see the same result
    /// pointer.
    ///
    /// # Panics
    ///
    /// If the job that was meant to resolve this future panicked, that panic is
    /// re-raised here rather than silently returning a poisoned or default value.
    pub fn wait(&self) -> Arc<T> {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            match &*state {
                Slot::Resolved(_) => break,
                Slot::Pending { .. } => {
                    state = self.shared.ready.wait(state).unwrap();
                }
            }
        }
        match &*state {
            Slot::Resolved(Outcome::Ready(value)) => value.clone(),
            Slot::Resolved(Outcome::Panicked(err)) => panic!("{err}"),
            Slot::Pending { .. } => unreachable!("checked above"),
        }
    }

    fn pending() -> PoolFuture<T> {
        PoolFuture {
            shared: Arc::new(Shared {
                state: Mutex::new(Slot::Pending {
                    continuations: Vec::new(),
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Stores `outcome`, wakes any waiters, and drains (re-submitting) every
    /// registered continuation — all under the future's lock, before it is
    /// released, so every continuation observes a value that has already been
    /// fully published.
    fn resolve(&self, outcome: Outcome<T>) {
        let mut state = self.shared.state.lock().unwrap();
        let continuations =
            match std::mem::replace(&mut *state, Slot::Resolved(outcome.clone())) {
                Slot::Pending { continuations } => continuations,
                Slot::Resolved(_) => unreachable!("a PoolFuture resolves at most once"),
            };
        self.shared.ready.notify_all();
        for continuation in continuations {
            let outcome = outcome.clone();
            let Continuation { pool, run } = continuation;
            if pool.submit(move || run(outcome)).is_err() {
                tracing::warn!("failed to re-submit continuation to a shutting-down pool");
            }
        }
        // `state` is dropped here, after every continuation has been submitted.
    }
}

fn run_catching<T, F>(f: F) -> Outcome<T>
where
    F: FnOnce() -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Outcome::Ready(Arc::new(value)),
        Err(payload) => Outcome::Panicked(TaskPanicked::from_payload(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Pool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn spawn_then_wait_round_trips() {
        let pool = Pool::new(2).unwrap();
        let future = PoolFuture::spawn(&pool, || 42).unwrap();
        assert_eq!(*future.wait(), 42);
        pool.shutdown();
    }

    #[test]
    fn map_chain_runs_in_order() {
        let pool = Pool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(1));
        let c = counter.clone();
        let f0 = PoolFuture::spawn(&pool, move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            n as i64
        })
        .unwrap();

        let mut current = f0;
        for _ in 0..4 {
            let c = counter.clone();
            current = current.map(&pool, move |prev| {
                let n = c.fetch_add(1, Ordering::SeqCst);
                prev * n as i64
            });
        }

        // 1 * 2 * 3 * 4 * 5 = 120, matching the factorial scenario in the spec.
        assert_eq!(*current.wait(), 120);
        pool.shutdown();
    }

    #[test]
    fn map_after_resolution_still_runs() {
        let pool = Pool::new(1).unwrap();
        let f = PoolFuture::spawn(&pool, || 10).unwrap();
        assert_eq!(*f.wait(), 10);
        let g = f.map(&pool, |v| v + 1);
        assert_eq!(*g.wait(), 11);
        pool.shutdown();
    }

    #[test]
    fn concurrent_waiters_see_the_same_value() {
        let pool = Pool::new(2).unwrap();
        let future = PoolFuture::spawn(&pool, || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            42
        })
        .unwrap();

        let f1 = future.clone();
        let f2 = future.clone();
        let h1 = std::thread::spawn(move || f1.wait());
        let h2 = std::thread::spawn(move || f2.wait());
        let v1 = h1.join().unwrap();
        let v2 = h2.join().unwrap();
        assert_eq!(*v1, 42);
        assert_eq!(*v2, 42);
        assert!(Arc::ptr_eq(&v1, &v2));
        pool.shutdown();
    }

    #[test]
    fn spawn_on_shutdown_pool_hands_future_back() {
        let pool = Pool::new(1).unwrap();
        pool.shutdown();
        match PoolFuture::spawn(&pool, || 1) {
            Err(SpawnError::SubmissionFailed(_future)) => {}
            other => panic!("expected SubmissionFailed, got {other:?}"),
        }
    }

    #[test]
    fn panic_in_task_is_reraised_on_wait() {
        let pool = Pool::new(1).unwrap();
        let future = PoolFuture::spawn(&pool, || -> i32 { panic!("boom") }).unwrap();
        let result = panic::catch_unwind(AssertUnwindSafe(|| future.wait()));
        assert!(result.is_err());
        pool.shutdown();
    }
}
