//! A fixed-size worker thread pool with future/promise composition: submit work,
//! chain computations on its result, and block until it's ready — plus a wavefront
//! knapsack and a parallel merge sort built on top as a case study of coordinating
//! data-dependent parallel work on the pool.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod future;
mod pool;
mod queue;

pub mod algorithms;

pub use error::{PoolError, SpawnError, SubmitError, TaskPanicked};
pub use future::PoolFuture;
pub use pool::{Pool, PoolBuilder};
