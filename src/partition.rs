//! Partitioning strategies for distributing element indices across workers
//!
//! Every index of the input is assigned to exactly one worker before any
//! worker starts. Assignment depends only on the index, the input length and
//! the worker count, never on timing, so re-running a call with the same
//! worker count always produces the same layout.

use crate::error::{Error, Result};
use crate::worker::WorkerId;
use std::collections::BTreeMap;

/// Trait for partitioning strategies
pub trait Partitioner: Send + Sync {
    /// Determine which worker owns `index` of an input of length `len`
    fn assign(&self, index: usize, len: usize, num_workers: usize) -> WorkerId;
}

/// Round-robin partitioner: index `i` goes to worker `i mod W`
///
/// Spreads sequentially-correlated cost (elements that get slower later in
/// the input) evenly across workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinPartitioner;

impl RoundRobinPartitioner {
    /// Create a new round-robin partitioner
    pub fn new() -> Self {
        Self
    }
}

impl Partitioner for RoundRobinPartitioner {
    fn assign(&self, index: usize, _len: usize, num_workers: usize) -> WorkerId {
        if num_workers == 0 {
            return 0;
        }

        index % num_workers
    }
}

/// Contiguous partitioner: worker `w` gets a run of `ceil(len / W)` indices
#[derive(Debug, Clone, Copy, Default)]
pub struct ContiguousPartitioner;

impl ContiguousPartitioner {
    /// Create a new contiguous partitioner
    pub fn new() -> Self {
        Self
    }
}

impl Partitioner for ContiguousPartitioner {
    fn assign(&self, index: usize, len: usize, num_workers: usize) -> WorkerId {
        if num_workers == 0 || len == 0 {
            return 0;
        }

        let chunk = len.div_ceil(num_workers);
        index / chunk
    }
}

/// Custom partitioner that allows user-defined logic
pub struct CustomPartitioner<F> {
    func: F,
}

impl<F> CustomPartitioner<F>
where
    F: Fn(usize, usize, usize) -> WorkerId + Send + Sync,
{
    /// Create a new custom partitioner with the given function
    ///
    /// The function receives `(index, len, num_workers)`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Partitioner for CustomPartitioner<F>
where
    F: Fn(usize, usize, usize) -> WorkerId + Send + Sync,
{
    fn assign(&self, index: usize, len: usize, num_workers: usize) -> WorkerId {
        (self.func)(index, len, num_workers)
    }
}

/// Indices of the input owned by one worker, in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    worker: WorkerId,
    indices: Vec<usize>,
}

impl Partition {
    /// Worker that owns this partition
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Owned indices
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of owned indices
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the worker has nothing to do
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Split `[0, len)` across `num_workers` workers
///
/// Only workers that own at least one index get a [`Partition`]; every other
/// worker's partition is empty and is not materialized, so the cost depends
/// on `len` and not on `num_workers`. Partitions are returned in ascending
/// worker order. Fails if `num_workers` is zero or the partitioner assigns an
/// index to a worker that does not exist.
pub fn split(partitioner: &dyn Partitioner, len: usize, num_workers: usize) -> Result<Vec<Partition>> {
    if num_workers == 0 {
        return Err(Error::InvalidWorkerCount(num_workers));
    }

    let mut assigned: BTreeMap<WorkerId, Vec<usize>> = BTreeMap::new();

    for index in 0..len {
        let worker = partitioner.assign(index, len, num_workers);
        if worker >= num_workers {
            return Err(Error::Partition(format!(
                "index {} assigned to worker {} but only {} workers exist",
                index, worker, num_workers
            )));
        }
        assigned.entry(worker).or_default().push(index);
    }

    Ok(assigned
        .into_iter()
        .map(|(worker, indices)| Partition { worker, indices })
        .collect())
}
