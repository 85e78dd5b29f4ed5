//! Per-partition workers
//!
//! A worker owns one [`Partition`], applies the operation to every element
//! it names and reports a [`PartialResult`] keyed by original index. Workers
//! never talk to each other; the only shared state is the read-only input,
//! the operation itself and the abort flag used for fail-fast.

use crate::partition::Partition;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Identifier of a worker within one call, in `[0, num_workers)`
pub type WorkerId = usize;

/// What a worker does with each element it owns
pub(crate) trait Operation<T>: Sync {
    /// Value kept for an element
    type Output: Send;

    /// Error returned by a fallible operation
    type Error: Send;

    /// Name used in log records
    const NAME: &'static str;

    /// Apply the user operation; `None` means nothing is kept for the element
    fn apply(&self, item: &T) -> Result<Option<Self::Output>, Self::Error>;
}

/// Keep the transformed value
pub(crate) struct MapOp<F>(pub F);

impl<T, R, F> Operation<T> for MapOp<F>
where
    F: Fn(&T) -> R + Sync,
    R: Send,
{
    type Output = R;
    type Error = Infallible;
    const NAME: &'static str = "map";

    fn apply(&self, item: &T) -> Result<Option<R>, Infallible> {
        Ok(Some((self.0)(item)))
    }
}

/// Keep the transformed value, stop at the first error
pub(crate) struct TryMapOp<F>(pub F);

impl<T, R, E, F> Operation<T> for TryMapOp<F>
where
    F: Fn(&T) -> Result<R, E> + Sync,
    R: Send,
    E: Send,
{
    type Output = R;
    type Error = E;
    const NAME: &'static str = "try_map";

    fn apply(&self, item: &T) -> Result<Option<R>, E> {
        (self.0)(item).map(Some)
    }
}

/// Keep the original value when the predicate holds
pub(crate) struct FilterOp<F>(pub F);

impl<T, F> Operation<T> for FilterOp<F>
where
    F: Fn(&T) -> bool + Sync,
    T: Clone + Send,
{
    type Output = T;
    type Error = Infallible;
    const NAME: &'static str = "filter";

    fn apply(&self, item: &T) -> Result<Option<T>, Infallible> {
        Ok((self.0)(item).then(|| item.clone()))
    }
}

/// Side effect only
pub(crate) struct EachOp<F>(pub F);

impl<T, F> Operation<T> for EachOp<F>
where
    F: Fn(&T) + Sync,
{
    type Output = ();
    type Error = Infallible;
    const NAME: &'static str = "each";

    fn apply(&self, item: &T) -> Result<Option<()>, Infallible> {
        (self.0)(item);
        Ok(None)
    }
}

/// A worker's index-keyed output
#[derive(Debug)]
pub(crate) struct PartialResult<R> {
    /// Worker that produced the entries
    pub worker: WorkerId,

    /// `(index, value)` pairs, ascending by index
    pub entries: Vec<(usize, R)>,

    /// Number of elements the operation was applied to
    pub processed: usize,
}

/// How a worker finished
#[derive(Debug)]
pub(crate) enum WorkerOutcome<R, E> {
    /// Every owned element was processed
    Completed(PartialResult<R>),

    /// The operation returned an error for `index`
    Failed {
        worker: WorkerId,
        index: usize,
        error: E,
    },

    /// Another worker failed first and this one stopped early
    Aborted {
        worker: WorkerId,
        processed: usize,
    },
}

/// Raises the abort flag if the worker unwinds
pub(crate) struct AbortOnPanic<'a>(pub &'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

/// Process one partition
pub(crate) fn run<T, O>(
    partition: &Partition,
    items: &[T],
    op: &O,
    abort: &AtomicBool,
) -> WorkerOutcome<O::Output, O::Error>
where
    O: Operation<T>,
{
    let worker = partition.worker();
    let _guard = AbortOnPanic(abort);
    let mut entries = Vec::new();

    for (processed, &index) in partition.indices().iter().enumerate() {
        if abort.load(Ordering::Acquire) {
            return WorkerOutcome::Aborted { worker, processed };
        }

        match op.apply(&items[index]) {
            Ok(Some(value)) => entries.push((index, value)),
            Ok(None) => {}
            Err(error) => {
                abort.store(true, Ordering::Release);
                return WorkerOutcome::Failed { worker, index, error };
            }
        }
    }

    WorkerOutcome::Completed(PartialResult {
        worker,
        entries,
        processed: partition.len(),
    })
}
