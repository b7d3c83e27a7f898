//! Accumulates a row-sum matrix by firing one fire-and-forget job per cell onto the
//! pool, each one sleeping for a configured duration before adding its value into a
//! per-row, mutex-protected accumulator — a port of the original implementation's
//! `macierz.c` ("matrix") example, which exercised the pool's plain `submit`/`defer`
//! primitive rather than the future layer (there's no result to chain here, only a
//! side effect to wait out via `Pool::shutdown`'s "every submitted job has run"
//! guarantee).
//!
//! Reads `rows`, `columns`, then `rows * columns` `(delay_ms value)` pairs from
//! stdin and prints the resulting per-row sums, one per line.

use std::io::{self, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use corepool::Pool;

fn main() {
    tracing_subscriber::fmt::init();

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .expect("failed to read stdin");
    let mut numbers = input.split_whitespace().map(|tok| {
        tok.parse::<i64>()
            .unwrap_or_else(|_| panic!("expected an integer, got {tok:?}"))
    });

    let rows = numbers.next().expect("missing row count") as usize;
    let columns = numbers.next().expect("missing column count") as usize;

    let pool = Pool::new(4).expect("failed to start pool");
    let sums: Vec<Arc<Mutex<i64>>> = (0..rows).map(|_| Arc::new(Mutex::new(0))).collect();

    for row in 0..rows {
        for _ in 0..columns {
            let delay_ms = numbers.next().expect("missing delay") as u64;
            let value = numbers.next().expect("missing value");
            let sum = sums[row].clone();
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(delay_ms));
                *sum.lock().unwrap() += value;
            })
            .expect("pool accepting work");
        }
    }

    // `shutdown` blocks until every job submitted above has run, so every row sum
    // is final once it returns.
    pool.shutdown();

    for sum in &sums {
        println!("{}", *sum.lock().unwrap());
    }
}
