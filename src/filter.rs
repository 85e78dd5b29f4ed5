//! Concurrent and serial filter

use crate::error::Result;
use crate::pool::{PoolConfig, WorkerPool};

/// Returns the elements of `items` for which `pred` holds, across
/// `num_workers` workers
///
/// Kept elements are cloned into the output in their original relative
/// order.
///
/// ```
/// let numbers: Vec<u32> = (0..10).collect();
/// let even = concurrently::filter(&numbers, |n| n % 2 == 0, 4).unwrap();
/// assert_eq!(even, vec![0, 2, 4, 6, 8]);
/// ```
///
/// The predicate must return `bool`:
///
/// ```compile_fail
/// let numbers = vec![1, 2, 3];
/// let _ = concurrently::filter(&numbers, |n: &i32| *n, 4);
/// ```
pub fn filter<T, F>(items: &[T], pred: F, num_workers: usize) -> Result<Vec<T>>
where
    T: Clone + Send + Sync,
    F: Fn(&T) -> bool + Sync,
{
    WorkerPool::new(PoolConfig::new().with_num_workers(num_workers))?.filter(items, pred)
}

/// Same contract as [`filter`], on the calling thread
pub fn filter_serial<T, F>(items: &[T], pred: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    items.iter().filter(|&item| pred(item)).cloned().collect()
}
