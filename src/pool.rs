use std::cmp;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::error::{PoolError, SubmitError};
use crate::queue::{Job, Queue};

/// A fixed-size pool of worker threads that execute submitted jobs in FIFO order.
///
/// This is a modern re-expression of the `thread_pool_t` from the original
/// implementation: worker threads block on a mutex/condvar pair while the task queue
/// is empty, wake up to drain it, and an orderly [`shutdown`](Pool::shutdown) lets
/// every already-submitted job run to completion before the worker threads exit. The
/// shape of the type itself — a shared `Inner` behind an `Arc`, configured through a
/// [`PoolBuilder`] — follows `futures_cpupool::CpuPool`/`Builder`, including its
/// handle-counting teardown: each worker thread holds its own permanent `Arc<Inner>`
/// clone for the lifetime of the pool, so the `Arc`'s own strong count never reaches
/// zero while a worker is running and can't drive a `Drop for Inner`. Instead `Inner`
/// carries a separate `handles` counter that only `Pool::clone`/`Pool::drop` touch,
/// exactly mirroring `CpuPool`'s `cnt` field.
///
/// `Pool` is cheap to [`Clone`]: every clone shares the same worker threads and task
/// queue, and increments `handles`. The pool is shut down (and its worker threads
/// joined) either explicitly via [`Pool::shutdown`] or implicitly once the last `Pool`
/// handle is dropped.
pub struct Pool {
    inner: Arc<Inner>,
}

impl Clone for Pool {
    fn clone(&self) -> Pool {
        self.inner.handles.fetch_add(1, Ordering::Relaxed);
        Pool {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // Mirrors `futures_cpupool::CpuPool`'s `Drop`: `handles` is a count of live
        // `Pool` handles, independent of the `Arc`'s own strong count (which every
        // worker thread's permanent `Inner` clone keeps well above zero). Only the
        // handle that brings this counter to zero triggers shutdown.
        if self.inner.handles.fetch_sub(1, Ordering::Relaxed) == 1 {
            self.inner.shutdown();
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("size", &self.inner.size)
            .finish_non_exhaustive()
    }
}

struct Inner {
    size: usize,
    state: Mutex<State>,
    work: Condvar,
    threads: Mutex<Vec<JoinHandle<()>>>,
    exit_on_shutdown: AtomicBool,
    /// Count of live `Pool` handles, distinct from the `Arc<Inner>` strong count —
    /// see the note on [`Pool`] for why the two must not be conflated.
    handles: AtomicUsize,
}

struct State {
    queue: Queue,
    shutting_down: bool,
}

/// Thread pool configuration object.
///
/// By default, the pool has as many workers as there are CPUs on the host (see
/// [`num_cpus`]).
pub struct PoolBuilder {
    pool_size: usize,
    stack_size: usize,
    name_prefix: Option<String>,
    after_start: Option<Arc<dyn Fn(usize) + Send + Sync>>,
    before_stop: Option<Arc<dyn Fn(usize) + Send + Sync>>,
}

impl fmt::Debug for PoolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("pool_size", &self.pool_size)
            .field("stack_size", &self.stack_size)
            .field("name_prefix", &self.name_prefix)
            .finish_non_exhaustive()
    }
}

impl Pool {
    /// Creates a new pool with `size` worker threads and the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroSized`] if `size == 0`, or
    /// [`PoolError::SpawnFailed`] if a worker thread could not be spawned — any
    /// workers already spawned are joined down before the error is returned.
    pub fn new(size: usize) -> Result<Pool, PoolError> {
        PoolBuilder::new().pool_size(size).build()
    }

    /// Starts building a pool with a customised configuration.
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Number of worker threads in this pool.
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Enqueues `job` for execution by a worker thread.
    ///
    /// Returns [`SubmitError::ShuttingDown`] if the pool has begun (or finished)
    /// shutting down; the job is not run in that case.
    pub fn submit<F>(&self, job: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.submit(Box::new(job))
    }

    /// Orderly shutdown: stops accepting new work, lets every already-submitted job
    /// run to completion, then joins every worker thread.
    ///
    /// Idempotent — calling this twice (or calling it after the pool has already been
    /// dropped once) is equivalent to calling it once.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Installs a process-wide `Ctrl+C` handler that triggers [`Pool::shutdown`] and
    /// then exits the process with code `130`, once the shutdown (and therefore every
    /// outstanding job) has completed.
    ///
    /// This replaces the original implementation's `SIGRTMIN` self-signalling
    /// bootstrap — used there only to smuggle a pool pointer into a POSIX handler
    /// that cannot otherwise receive context — with a plain closure capture, which
    /// the design notes call out as the preferred approach whenever the host
    /// language supports it.
    ///
    /// Like the original, this assumes exactly one pool is active per process:
    /// `ctrlc::set_handler` can only be installed once, and a second call from a
    /// second pool returns [`PoolError::HandlerAlreadyInstalled`].
    pub fn install_ctrlc_handler(&self) -> Result<(), PoolError> {
        let inner = self.inner.clone();
        ctrlc::set_handler(move || {
            tracing::info!("Ctrl+C received, shutting down pool");
            inner.exit_on_shutdown.store(true, Ordering::SeqCst);
            inner.shutdown();
        })
        .map_err(PoolError::HandlerAlreadyInstalled)
    }
}

impl Inner {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        let mut state = self.state.lock().unwrap();
        if state.shutting_down {
            return Err(SubmitError::ShuttingDown);
        }
        state.queue.push(job);
        tracing::trace!(waiting = state.queue.len(), "task submitted");
        self.work.notify_one();
        Ok(())
    }

    fn shutdown(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.shutting_down {
                return;
            }
            state.shutting_down = true;
            tracing::debug!("pool shutdown requested");
        }
        self.work.notify_all();

        let threads = std::mem::take(&mut *self.threads.lock().unwrap());
        for handle in threads {
            let _ = handle.join();
        }
        tracing::debug!("pool shutdown complete");

        if self.exit_on_shutdown.load(Ordering::SeqCst) {
            std::process::exit(130);
        }
    }

    /// Blocks until there is a job to run or the pool is shutting down with an empty
    /// queue, in which case `None` is returned and the worker should exit.
    fn next_job(&self) -> Option<Job> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(job) = state.queue.pop() {
                return Some(job);
            }
            if state.shutting_down {
                return None;
            }
            state = self.wait_for_work(state);
        }
    }

    fn wait_for_work<'a>(&self, state: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.work.wait(state).unwrap()
    }
}

impl PoolBuilder {
    /// Creates a builder with a worker count equal to the number of CPUs on the
    /// host.
    pub fn new() -> Self {
        PoolBuilder {
            pool_size: cmp::max(1, num_cpus::get()),
            stack_size: 0,
            name_prefix: None,
            after_start: None,
            before_stop: None,
        }
    }

    /// Sets the number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `size == 0` — use [`Pool::new`]/[`PoolBuilder::build`] if you want a
    /// recoverable error instead of a panic on misuse at the call site.
    pub fn pool_size(&mut self, size: usize) -> &mut Self {
        assert!(size > 0, "pool size must be greater than zero");
        self.pool_size = size;
        self
    }

    /// Sets the stack size of worker threads, in bytes. `0` (the default) uses the
    /// platform default stack size.
    pub fn stack_size(&mut self, stack_size: usize) -> &mut Self {
        self.stack_size = stack_size;
        self
    }

    /// Sets the thread name prefix. Worker `i` is named `"{prefix}{i}"`.
    pub fn name_prefix<S: Into<String>>(&mut self, name_prefix: S) -> &mut Self {
        self.name_prefix = Some(name_prefix.into());
        self
    }

    /// Registers a hook run on each worker thread immediately after it starts, but
    /// before it processes any job. Receives the worker's index.
    pub fn after_start<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.after_start = Some(Arc::new(f));
        self
    }

    /// Registers a hook run on each worker thread just before it exits during
    /// shutdown. Receives the worker's index.
    pub fn before_stop<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.before_stop = Some(Arc::new(f));
        self
    }

    /// Builds the pool, spawning all worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::SpawnFailed`] if any worker thread fails to spawn; any
    /// workers already spawned are shut down and joined before the error is
    /// returned.
    pub fn build(&self) -> Result<Pool, PoolError> {
        if self.pool_size == 0 {
            return Err(PoolError::ZeroSized);
        }

        let inner = Arc::new(Inner {
            size: self.pool_size,
            state: Mutex::new(State {
                queue: Queue::new(),
                shutting_down: false,
            }),
            work: Condvar::new(),
            threads: Mutex::new(Vec::with_capacity(self.pool_size)),
            exit_on_shutdown: AtomicBool::new(false),
            handles: AtomicUsize::new(1),
        });

        let mut threads = Vec::with_capacity(self.pool_size);
        for idx in 0..self.pool_size {
            match self.spawn_worker(idx, inner.clone()) {
                Ok(handle) => threads.push(handle),
                Err(err) => {
                    // Stop any workers already spawned before surfacing the error.
                    inner.shutdown();
                    return Err(PoolError::SpawnFailed(err));
                }
            }
        }
        *inner.threads.lock().unwrap() = threads;

        Ok(Pool { inner })
    }

    fn spawn_worker(&self, idx: usize, inner: Arc<Inner>) -> io::Result<JoinHandle<()>> {
        let after_start = self.after_start.clone();
        let before_stop = self.before_stop.clone();

        let mut builder = thread::Builder::new();
        if let Some(prefix) = &self.name_prefix {
            builder = builder.name(format!("{prefix}{idx}"));
        }
        if self.stack_size > 0 {
            builder = builder.stack_size(self.stack_size);
        }

        builder.spawn(move || {
            if let Some(hook) = after_start {
                hook(idx);
            }
            tracing::trace!(worker = idx, "worker started");
            while let Some(job) = inner.next_job() {
                job();
            }
            tracing::trace!(worker = idx, "worker stopped");
            if let Some(hook) = before_stop {
                hook(idx);
            }
        })
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
