use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::algorithms::latch::Latch;
use crate::algorithms::partition::column_ranges;
use crate::pool::Pool;

/// Solves 0/1 knapsack for `items.len()` items against `capacity`, returning the best
/// achievable total value.
///
/// The DP table is row-major, one row per item (plus a base row of zeros for "no items
/// considered yet"), columns `0..=capacity`. Each row is split into `pool.size()`
/// contiguous column ranges, one per worker, submitted to `pool` as independent jobs —
/// a column-range wavefront across a fixed worker count rather than a thread spawned
/// per cell. A worker computing row `r` first waits on row `r - 1`'s [`Latch`] (every
/// column range of the previous row has been written), computes its slice of row `r`
/// from the already-settled previous row, and the last worker to finish row `r` fires
/// that row's latch for row `r + 1` to wait on.
///
/// Zero items returns `0` immediately with no rows scheduled.
pub fn pack_eggs(pool: &Pool, weights: &[usize], values: &[u64], capacity: usize) -> u64 {
    assert_eq!(
        weights.len(),
        values.len(),
        "weights and values must have the same length"
    );
    let item_count = weights.len();
    if item_count == 0 {
        return 0;
    }

    let ranges = column_ranges(capacity + 1, pool.size());

    let table: Arc<Vec<Mutex<Vec<u64>>>> = Arc::new(
        (0..=item_count)
            .map(|_| Mutex::new(vec![0u64; capacity + 1]))
            .collect(),
    );

    let row_gates: Vec<Arc<Latch>> = (0..=item_count).map(|_| Arc::new(Latch::new())).collect();
    row_gates[0].fire();

    for row in 1..=item_count {
        let weight = weights[row - 1];
        let value = values[row - 1];
        let remaining = Arc::new(AtomicUsize::new(ranges.len()));
        let prev_gate = row_gates[row - 1].clone();
        let this_gate = row_gates[row].clone();

        for &(beg, end) in &ranges {
            let table = table.clone();
            let prev_gate = prev_gate.clone();
            let this_gate = this_gate.clone();
            let remaining = remaining.clone();

            pool.submit(move || {
                prev_gate.wait();
                let prev_row = table[row - 1].lock().unwrap().clone();
                {
                    let mut current = table[row].lock().unwrap();
                    for col in beg..end {
                        let without_item = prev_row[col];
                        let with_item = if col >= weight {
                            prev_row[col - weight] + value
                        } else {
                            without_item
                        };
                        current[col] = without_item.max(with_item);
                    }
                }
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    this_gate.fire();
                }
            })
            .expect("pool accepting work while packing eggs");
        }
    }

    row_gates[item_count].wait();
    table[item_count].lock().unwrap()[capacity]
}
