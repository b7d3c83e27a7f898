//! Two worked case studies of data-dependent parallel work built directly on
//! [`crate::pool`]: a wavefront 0/1 knapsack and a tree-structured parallel merge
//! sort. Neither routes through [`crate::future`] — only completion order matters
//! here, not a value flowing back through a chain — so they coordinate with the
//! single-shot [`latch::Latch`] instead.

mod knapsack;
mod latch;
mod mergesort;
mod partition;

pub use knapsack::pack_eggs;
pub use mergesort::arrange_sand;
