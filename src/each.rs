//! Concurrent and serial each

use crate::error::Result;
use crate::pool::{PoolConfig, WorkerPool};

/// Invokes `op` exactly once for each element of `items`, across
/// `num_workers` workers
///
/// Returns once every invocation has finished. Invocations on different
/// workers interleave freely, so `op` must be safe to run concurrently.
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let numbers = vec![1u32, 2, 3];
/// let total = AtomicU32::new(0);
/// concurrently::each(&numbers, |n| { total.fetch_add(*n, Ordering::Relaxed); }, 2).unwrap();
/// assert_eq!(total.into_inner(), 6);
/// ```
///
/// The operation must take the slice's element type:
///
/// ```compile_fail
/// let numbers = vec![1u32, 2, 3];
/// let _ = concurrently::each(&numbers, |s: &String| println!("{}", s), 2);
/// ```
pub fn each<T, F>(items: &[T], op: F, num_workers: usize) -> Result<()>
where
    T: Sync,
    F: Fn(&T) + Sync,
{
    WorkerPool::new(PoolConfig::new().with_num_workers(num_workers))?.each(items, op)
}

/// Same contract as [`each`], on the calling thread
pub fn each_serial<T, F>(items: &[T], op: F)
where
    F: Fn(&T),
{
    items.iter().for_each(op);
}
