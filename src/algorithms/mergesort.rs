use std::sync::{Arc, Mutex};

use crate::algorithms::latch::Latch;
use crate::pool::Pool;

/// A pending or finished sort of one contiguous chunk: a [`Latch`] fired once `result`
/// is populated.
struct Node<T> {
    latch: Arc<Latch>,
    result: Arc<Mutex<Option<Vec<T>>>>,
}

/// Sorts `data` using a binary tree of chunks submitted to `pool`: the input is split
/// in half repeatedly until a chunk has length 1 or the subtree's leaf budget (derived
/// from `pool.size()`) is exhausted, whichever comes first. Leaves sort their chunk
/// sequentially; each internal node performs a sequential merge of its two children's
/// sorted chunks, scheduled only once both children's `Latch` have fired.
///
/// Every node in the tree is submitted to `pool` up front, both children always
/// enqueued before their parent. Combined with the pool's FIFO dispatch, that
/// ordering guarantees a merge job is only ever dequeued after both the jobs it
/// depends on have already been claimed by some worker, so no job ever blocks
/// indefinitely on work the pool hasn't started.
///
/// An empty input returns immediately with no work scheduled.
pub fn arrange_sand<T>(pool: &Pool, data: Vec<T>) -> Vec<T>
where
    T: Ord + Send + 'static,
{
    if data.is_empty() {
        return data;
    }

    let leaf_budget = pool.size().max(1);
    let root = build(pool, data, leaf_budget);
    root.latch.wait();
    root.result
        .lock()
        .unwrap()
        .take()
        .expect("root chunk resolved once its latch has fired")
}

fn build<T>(pool: &Pool, chunk: Vec<T>, leaf_budget: usize) -> Node<T>
where
    T: Ord + Send + 'static,
{
    if chunk.len() <= 1 || leaf_budget <= 1 {
        return spawn_leaf(pool, chunk);
    }

    let mut left_half = chunk;
    let right_half = left_half.split_off(left_half.len() / 2);
    let left_budget = (leaf_budget / 2).max(1);
    let right_budget = (leaf_budget - left_budget).max(1);

    let left = build(pool, left_half, left_budget);
    let right = build(pool, right_half, right_budget);
    spawn_merge(pool, left, right)
}

fn spawn_leaf<T>(pool: &Pool, mut chunk: Vec<T>) -> Node<T>
where
    T: Ord + Send + 'static,
{
    let latch = Arc::new(Latch::new());
    let result = Arc::new(Mutex::new(None));
    let node = Node {
        latch: latch.clone(),
        result: result.clone(),
    };

    pool.submit(move || {
        chunk.sort();
        *result.lock().unwrap() = Some(chunk);
        latch.fire();
    })
    .expect("pool accepting work while sorting a leaf chunk");

    node
}

fn spawn_merge<T>(pool: &Pool, left: Node<T>, right: Node<T>) -> Node<T>
where
    T: Ord + Send + 'static,
{
    let latch = Arc::new(Latch::new());
    let result = Arc::new(Mutex::new(None));
    let node = Node {
        latch: latch.clone(),
        result: result.clone(),
    };

    pool.submit(move || {
        left.latch.wait();
        right.latch.wait();
        let left_chunk = left
            .result
            .lock()
            .unwrap()
            .take()
            .expect("left child resolved once its latch has fired");
        let right_chunk = right
            .result
            .lock()
            .unwrap()
            .take()
            .expect("right child resolved once its latch has fired");
        *result.lock().unwrap() = Some(merge(left_chunk, right_chunk));
        latch.fire();
    })
    .expect("pool accepting work while merging two chunks");

    node
}

fn merge<T: Ord>(left: Vec<T>, right: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        match (left.peek(), right.peek()) {
            (Some(l), Some(r)) if l <= r => merged.push(left.next().unwrap()),
            (Some(_), Some(_)) => merged.push(right.next().unwrap()),
            (Some(_), None) => merged.push(left.next().unwrap()),
            (None, Some(_)) => merged.push(right.next().unwrap()),
            (None, None) => break,
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_immediately() {
        let pool = Pool::new(4).unwrap();
        let sorted: Vec<i32> = arrange_sand(&pool, Vec::new());
        assert!(sorted.is_empty());
        pool.shutdown();
    }

    #[test]
    fn sorts_unordered_input() {
        let pool = Pool::new(4).unwrap();
        let data = vec![5, 3, 8, 1, 9, 2, 7, 4, 6, 0];
        let sorted = arrange_sand(&pool, data);
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
        pool.shutdown();
    }

    #[test]
    fn handles_duplicates() {
        let pool = Pool::new(3).unwrap();
        let data = vec![4, 2, 4, 1, 2, 4, 1];
        let mut expected = data.clone();
        expected.sort();
        assert_eq!(arrange_sand(&pool, data), expected);
        pool.shutdown();
    }

    #[test]
    fn single_worker_sorts_correctly() {
        let pool = Pool::new(1).unwrap();
        let data = vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
        let sorted = arrange_sand(&pool, data);
        assert_eq!(sorted, (1..=10).collect::<Vec<_>>());
        pool.shutdown();
    }

    #[test]
    fn single_element_is_already_sorted() {
        let pool = Pool::new(2).unwrap();
        assert_eq!(arrange_sand(&pool, vec![42]), vec![42]);
        pool.shutdown();
    }
}
