//! Computes `n!` as a chain of `n` [`map`](corepool::PoolFuture::map) calls, each one
//! multiplying the running product by an incrementing counter — a direct port of the
//! original implementation's `silnia.c` ("factorial") example onto `Pool`/`PoolFuture`.
//!
//! Run with an optional `n` on the command line (defaults to `10`); set `RUST_LOG=trace` to
//! see the pool's worker and continuation-drain events:
//!
//! ```text
//! RUST_LOG=trace cargo run --example factorial_chain -- 10
//! ```

use std::sync::{Arc, Mutex};

use corepool::{Pool, PoolFuture};

fn main() {
    tracing_subscriber::fmt::init();

    let n: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);

    if n < 1 {
        println!("1");
        return;
    }

    let pool = Pool::new(3).expect("failed to start pool");

    // Shared with every step, exactly like the original's `multiply_by` global
    // behind its own mutex.
    let multiply_by = Arc::new(Mutex::new(1u64));

    let mut current: PoolFuture<u64> =
        PoolFuture::spawn(&pool, || 1u64).expect("pool accepting work");

    for _ in 0..n {
        let multiply_by = multiply_by.clone();
        current = current.map(&pool, move |base| {
            let mut multiply_by = multiply_by.lock().unwrap();
            let product = base * *multiply_by;
            *multiply_by += 1;
            product
        });
    }

    println!("{}", current.wait());
    pool.shutdown();
}
