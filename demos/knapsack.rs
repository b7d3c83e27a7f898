//! Solves a small 0/1 knapsack instance with the wavefront parallel DP from
//! [`corepool::algorithms::pack_eggs`].

use corepool::algorithms::pack_eggs;
use corepool::Pool;

fn main() {
    tracing_subscriber::fmt::init();

    let weights = [2usize, 3, 4, 5, 9];
    let values = [3u64, 4, 5, 8, 10];
    let capacity = 20;

    let pool = Pool::new(4).expect("failed to start pool");
    let best = pack_eggs(&pool, &weights, &values, capacity);
    pool.shutdown();

    println!("best value for capacity {capacity}: {best}");
}
