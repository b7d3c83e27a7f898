//! Black-box integration tests exercising the pool, future, and case-study
//! algorithms together, the way a caller outside the crate would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use corepool::algorithms::{arrange_sand, pack_eggs};
use corepool::{Pool, PoolFuture, SubmitError};

#[test]
fn spawn_map_wait_round_trip() {
    let pool = Pool::new(4).unwrap();
    let future = PoolFuture::spawn(&pool, || 2).unwrap();
    let doubled = future.map(&pool, |v| v * 2);
    let tripled = doubled.map(&pool, |v| v * 3);
    assert_eq!(*tripled.wait(), 12);
    pool.shutdown();
}

#[test]
fn pool_size_one_runs_submissions_serially() {
    let pool = Pool::new(1).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..20 {
        let order = order.clone();
        pool.submit(move || order.lock().unwrap().push(i)).unwrap();
    }
    pool.shutdown();
    assert_eq!(*order.lock().unwrap(), (0..20).collect::<Vec<_>>());
}

#[test]
fn shutdown_runs_every_task_submitted_beforehand() {
    let pool = Pool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..200 {
        let counter = counter.clone();
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    pool.shutdown();
    assert_eq!(counter.load(Ordering::SeqCst), 200);
}

#[test]
fn double_shutdown_and_post_shutdown_submit() {
    let pool = Pool::new(2).unwrap();
    pool.shutdown();
    pool.shutdown();
    assert!(matches!(
        pool.submit(|| {}),
        Err(SubmitError::ShuttingDown)
    ));
}

#[test]
fn dropping_the_last_handle_shuts_the_pool_down() {
    let pool = Pool::new(2).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..10 {
        let counter = counter.clone();
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    drop(pool);
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn pool_outlives_a_dropped_clone_while_another_handle_is_live() {
    let pool = Pool::new(2).unwrap();
    let clone = pool.clone();
    drop(pool);

    // The first handle's drop must not have shut anything down: `clone` can still
    // submit and have its work run.
    let counter = Arc::new(AtomicUsize::new(0));
    let counter2 = counter.clone();
    clone
        .submit(move || {
            counter2.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    drop(clone);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn knapsack_empty_input_is_a_boundary_case() {
    let pool = Pool::new(4).unwrap();
    assert_eq!(pack_eggs(&pool, &[], &[], 50), 0);
    pool.shutdown();
}

#[test]
fn knapsack_matches_a_brute_force_reference() {
    let pool = Pool::new(4).unwrap();
    let weights = [2usize, 3, 4, 5, 9];
    let values = [3u64, 4, 5, 8, 10];
    let capacity = 15;

    let parallel = pack_eggs(&pool, &weights, &values, capacity);
    pool.shutdown();

    assert_eq!(parallel, brute_force_knapsack(&weights, &values, capacity));
}

fn brute_force_knapsack(weights: &[usize], values: &[u64], capacity: usize) -> u64 {
    let mut best = 0;
    for mask in 0..(1u32 << weights.len()) {
        let mut weight = 0usize;
        let mut value = 0u64;
        for (i, (&w, &v)) in weights.iter().zip(values).enumerate() {
            if mask & (1 << i) != 0 {
                weight += w;
                value += v;
            }
        }
        if weight <= capacity {
            best = best.max(value);
        }
    }
    best
}

#[test]
fn merge_sort_empty_input_is_a_boundary_case() {
    let pool = Pool::new(4).unwrap();
    let sorted: Vec<i32> = arrange_sand(&pool, Vec::new());
    assert!(sorted.is_empty());
    pool.shutdown();
}

#[test]
fn merge_sort_matches_the_standard_library_for_random_input() {
    let pool = Pool::new(4).unwrap();
    let data: Vec<i64> = (0..500)
        .map(|i| ((i * 2654435761u64) % 10_000) as i64)
        .collect();

    let mut expected = data.clone();
    expected.sort();

    let sorted = arrange_sand(&pool, data);
    pool.shutdown();

    assert_eq!(sorted, expected);
}

#[test]
fn ctrlc_handler_can_only_be_installed_once_per_process() {
    let pool = Pool::new(1).unwrap();
    pool.install_ctrlc_handler()
        .expect("first installation should succeed");
    assert!(pool.install_ctrlc_handler().is_err());
    pool.shutdown();
}
