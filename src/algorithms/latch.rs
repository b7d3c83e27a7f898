use std::sync::{Condvar, Mutex};

/// A single-shot gate: `fire` sets it exactly once, `wait` blocks until it is set.
///
/// Used by the wavefront knapsack and the parallel merge sort to express "don't start
/// this piece of work until that other piece has finished" without routing a value
/// through a [`PoolFuture`](crate::future::PoolFuture) — only completion order matters
/// here, not a result.
pub(crate) struct Latch {
    fired: Mutex<bool>,
    ready: Condvar,
}

impl Latch {
    pub(crate) fn new() -> Self {
        Latch {
            fired: Mutex::new(false),
            ready: Condvar::new(),
        }
    }

    /// Sets the latch and wakes every waiter. Idempotent: firing an already-fired
    /// latch is a no-op.
    pub(crate) fn fire(&self) {
        let mut fired = self.fired.lock().unwrap();
        if *fired {
            return;
        }
        *fired = true;
        self.ready.notify_all();
    }

    /// Blocks until [`fire`](Latch::fire) has been called.
    pub(crate) fn wait(&self) {
        let mut fired = self.fired.lock().unwrap();
        while !*fired {
            fired = self.ready.wait(fired).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_blocks_until_fired() {
        let latch = Arc::new(Latch::new());
        let waiter = latch.clone();
        let handle = thread::spawn(move || waiter.wait());

        thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished());
        latch.fire();
        handle.join().unwrap();
    }

    #[test]
    fn wait_on_already_fired_latch_returns_immediately() {
        let latch = Latch::new();
        latch.fire();
        latch.wait();
    }

    #[test]
    fn double_fire_is_a_no_op() {
        let latch = Latch::new();
        latch.fire();
        latch.fire();
        latch.wait();
    }
}
