//! Concurrent and serial map

use crate::error::{BoxError, Error, Result};
use crate::pool::{PoolConfig, WorkerPool};

/// Applies `op` to each element of `items` across `num_workers` workers
///
/// The output has the same length as the input and is in input order no
/// matter which worker finishes first.
///
/// ```
/// let numbers: Vec<u32> = (0..10).collect();
/// let doubled = concurrently::map(&numbers, |n| n * 2, 4).unwrap();
/// assert_eq!(doubled, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
/// ```
///
/// The operation takes exactly one element; anything else is rejected at
/// compile time, before any worker could run:
///
/// ```compile_fail
/// let numbers = vec![1, 2, 3];
/// let _ = concurrently::map(&numbers, |a: &i32, b: &i32| a + b, 4);
/// ```
pub fn map<T, R, F>(items: &[T], op: F, num_workers: usize) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    WorkerPool::new(PoolConfig::new().with_num_workers(num_workers))?.map(items, op)
}

/// Same contract as [`map`], on the calling thread
pub fn map_serial<T, R, F>(items: &[T], op: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(op).collect()
}

/// Like [`map`], but `op` may fail
///
/// The first failure observed stops the remaining workers and is returned as
/// [`Error::Operation`] carrying the failing index. No partial output is
/// returned.
pub fn try_map<T, R, E, F>(items: &[T], op: F, num_workers: usize) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    E: Into<BoxError> + Send,
    F: Fn(&T) -> std::result::Result<R, E> + Sync,
{
    WorkerPool::new(PoolConfig::new().with_num_workers(num_workers))?.try_map(items, op)
}

/// Same contract as [`try_map`], on the calling thread
pub fn try_map_serial<T, R, E, F>(items: &[T], op: F) -> Result<Vec<R>>
where
    E: Into<BoxError>,
    F: Fn(&T) -> std::result::Result<R, E>,
{
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            op(item).map_err(|e| Error::Operation {
                index,
                source: e.into(),
            })
        })
        .collect()
}
