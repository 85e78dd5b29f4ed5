//! # Concurrently
//!
//! Concurrent higher-order functions over slices: [`map`], [`filter`] and
//! [`each`], with the work spread across a fixed number of worker threads.
//! Aimed at embarrassingly-parallel, typically I/O-bound per-element work.
//!
//! ## Key Features
//!
//! - **Order preserving**: output is always in input order, whatever order
//!   workers finish in
//! - **Bounded workers**: the worker count is chosen by the caller and is
//!   independent of the input length
//! - **Deterministic partitioning**: index `i` goes to worker `i mod W`
//! - **Fail-fast**: the first panic or error stops the remaining workers and
//!   the call returns an [`Error`], never partial output
//! - **Serial twins**: [`map_serial`], [`filter_serial`] and [`each_serial`]
//!   share the same contract without threads, for baselines
//!
//! ## Architecture
//!
//! ```text
//!                 ┌────────────┐
//!   items ──────> │ Partitioner│  i -> i mod W
//!                 └─────┬──────┘
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌──────────┐ ┌──────────┐ ┌──────────┐
//!   │ Worker 0 │ │ Worker 1 │ │ Worker W │   scoped threads
//!   └────┬─────┘ └────┬─────┘ └────┬─────┘
//!        │  partial results (index, value)
//!        └────────────┼────────────┘
//!                     ▼
//!              ┌────────────┐
//!              │ Collector  │  slots by index, then join all workers
//!              └────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use concurrently::prelude::*;
//!
//! let urls = vec!["a.example", "bb.example", "ccc.example"];
//! let lengths = map(&urls, |url| url.len(), 16)?;
//! assert_eq!(lengths, vec![9, 10, 11]);
//!
//! let pool = WorkerPool::new(PoolConfig::new().with_num_workers(2))?;
//! let short = pool.filter(&urls, |url| url.len() < 11)?;
//! assert_eq!(short, vec!["a.example", "bb.example"]);
//! # Ok::<(), concurrently::Error>(())
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod each;
pub mod error;
pub mod filter;
pub mod map;
pub mod partition;
pub mod pool;

mod collector;
mod worker;

// Re-exports
pub use each::{each, each_serial};
pub use error::{BoxError, Error, Result};
pub use filter::{filter, filter_serial};
pub use map::{map, map_serial, try_map, try_map_serial};
pub use partition::{
    split, ContiguousPartitioner, CustomPartitioner, Partition, Partitioner, RoundRobinPartitioner,
};
pub use pool::{PoolConfig, WorkerPool};
pub use worker::WorkerId;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::each::{each, each_serial};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{filter, filter_serial};
    pub use crate::map::{map, map_serial, try_map, try_map_serial};
    pub use crate::partition::Partitioner;
    pub use crate::pool::{PoolConfig, WorkerPool};
}
