//! Fan-in of partial results
//!
//! Collectors run on the calling thread and absorb one [`PartialResult`] per
//! worker, in whatever order workers finish. Partitions are disjoint, so each
//! output slot is written by at most one partial result. `finish` is only
//! called after every worker has been joined.

use crate::error::{Error, Result};
use crate::worker::PartialResult;

/// Reassembles partial results into the final output
pub(crate) trait Collector<R> {
    /// Final output of the call
    type Output;

    /// Merge one worker's partial result
    fn absorb(&mut self, partial: PartialResult<R>);

    /// Produce the output once every worker has reported
    fn finish(self) -> Result<Self::Output>;
}

/// One slot per input index, every slot must be filled
pub(crate) struct OrderedCollector<R> {
    slots: Vec<Option<R>>,
}

impl<R> OrderedCollector<R> {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }
}

impl<R> Collector<R> for OrderedCollector<R> {
    type Output = Vec<R>;

    fn absorb(&mut self, partial: PartialResult<R>) {
        for (index, value) in partial.entries {
            self.slots[index] = Some(value);
        }
    }

    fn finish(self) -> Result<Vec<R>> {
        let mut out = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            out.push(slot.ok_or(Error::MissingResult { index })?);
        }
        Ok(out)
    }
}

/// Kept values in a pre-sized buffer, rescanned in ascending index order
pub(crate) struct FilterCollector<T> {
    kept: Vec<Option<T>>,
}

impl<T> FilterCollector<T> {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            kept: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }
}

impl<T> Collector<T> for FilterCollector<T> {
    type Output = Vec<T>;

    fn absorb(&mut self, partial: PartialResult<T>) {
        for (index, value) in partial.entries {
            self.kept[index] = Some(value);
        }
    }

    fn finish(self) -> Result<Vec<T>> {
        Ok(self.kept.into_iter().flatten().collect())
    }
}

/// No data merge, only checks that every element was processed
pub(crate) struct CompletionCollector {
    expected: usize,
    processed: usize,
}

impl CompletionCollector {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            expected: len,
            processed: 0,
        }
    }
}

impl Collector<()> for CompletionCollector {
    type Output = ();

    fn absorb(&mut self, partial: PartialResult<()>) {
        self.processed += partial.processed;
    }

    fn finish(self) -> Result<()> {
        if self.processed < self.expected {
            return Err(Error::Incomplete {
                processed: self.processed,
                expected: self.expected,
            });
        }
        Ok(())
    }
}
