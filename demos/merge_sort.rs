//! Sorts a vector of random-ish integers with the tree-structured parallel merge
//! sort from [`corepool::algorithms::arrange_sand`].

use corepool::algorithms::arrange_sand;
use corepool::Pool;

fn main() {
    tracing_subscriber::fmt::init();

    let data: Vec<i64> = (0..64)
        .map(|i| ((i * 2654435761u64) % 1000) as i64)
        .collect();

    let pool = Pool::new(4).expect("failed to start pool");
    let sorted = arrange_sand(&pool, data);
    pool.shutdown();

    for value in sorted {
        println!("{value}");
    }
}
