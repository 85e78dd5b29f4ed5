//! Per-call worker pool
//!
//! A [`WorkerPool`] holds configuration and a partitioning strategy. Every
//! call spawns a fresh set of scoped worker threads, one per non-empty
//! partition, and joins all of them before returning. No thread outlives
//! the call that created it.

use crate::collector::{Collector, CompletionCollector, FilterCollector, OrderedCollector};
use crate::error::{panic_message, BoxError, Error, Result};
use crate::partition::{split, Partitioner, RoundRobinPartitioner};
use crate::worker::{self, EachOp, FilterOp, MapOp, Operation, TryMapOp, WorkerOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers per call
    pub num_workers: usize,

    /// Prefix for worker thread names
    pub thread_name_prefix: String,

    /// Stack size for worker threads (None = default)
    pub stack_size: Option<usize>,

    /// Whether to pin each worker to a CPU core
    pub enable_cpu_affinity: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            thread_name_prefix: "concurrently".to_string(),
            stack_size: None,
            enable_cpu_affinity: false,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers
    pub fn with_num_workers(mut self, num: usize) -> Self {
        self.num_workers = num;
        self
    }

    /// Set the worker thread name prefix
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set stack size
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Enable CPU affinity pinning
    pub fn with_cpu_affinity(mut self, enable: bool) -> Self {
        self.enable_cpu_affinity = enable;
        self
    }

    /// Check the configuration before any worker is spawned
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::InvalidWorkerCount(self.num_workers));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(Error::InvalidConfig(
                "thread name prefix must not be empty".to_string(),
            ));
        }
        if self.stack_size == Some(0) {
            return Err(Error::InvalidConfig(
                "stack size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Distributes map, filter and each calls across a fixed number of workers
pub struct WorkerPool {
    /// Pool configuration
    config: PoolConfig,

    /// Assigns element indices to workers
    partitioner: Arc<dyn Partitioner>,
}

impl WorkerPool {
    /// Create a worker pool using round-robin partitioning
    pub fn new(config: PoolConfig) -> Result<Self> {
        Self::with_partitioner(config, Arc::new(RoundRobinPartitioner::new()))
    }

    /// Create a worker pool with a custom partitioner
    pub fn with_partitioner(config: PoolConfig, partitioner: Arc<dyn Partitioner>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            partitioner,
        })
    }

    /// Get the number of workers per call
    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Apply `op` to every element and return the results in input order
    pub fn map<T, R, F>(&self, items: &[T], op: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        self.execute(items, MapOp(op), OrderedCollector::new(items.len()))
    }

    /// Like [`map`](Self::map), but `op` may fail
    ///
    /// The first error stops the remaining workers and is returned as
    /// [`Error::Operation`].
    pub fn try_map<T, R, E, F>(&self, items: &[T], op: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        E: Into<BoxError> + Send,
        F: Fn(&T) -> std::result::Result<R, E> + Sync,
    {
        self.execute(items, TryMapOp(op), OrderedCollector::new(items.len()))
    }

    /// Keep the elements for which `pred` holds, in input order
    pub fn filter<T, F>(&self, items: &[T], pred: F) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync,
        F: Fn(&T) -> bool + Sync,
    {
        self.execute(items, FilterOp(pred), FilterCollector::new(items.len()))
    }

    /// Invoke `op` once per element for its side effects
    pub fn each<T, F>(&self, items: &[T], op: F) -> Result<()>
    where
        T: Sync,
        F: Fn(&T) + Sync,
    {
        self.execute(items, EachOp(op), CompletionCollector::new(items.len()))
    }

    /// Partition, fan out, wait for every worker, fan in
    fn execute<T, O, C>(&self, items: &[T], op: O, mut collector: C) -> Result<C::Output>
    where
        T: Sync,
        O: Operation<T>,
        O::Error: Into<BoxError>,
        C: Collector<O::Output>,
    {
        let num_workers = self.config.num_workers;
        let partitions = split(self.partitioner.as_ref(), items.len(), num_workers)?;
        let active = partitions.len();

        debug!(
            operation = O::NAME,
            items = items.len(),
            workers = num_workers,
            active,
            "dispatching"
        );

        if active == 0 {
            return collector.finish();
        }

        let core_ids = if self.config.enable_cpu_affinity {
            core_affinity::get_core_ids().unwrap_or_default()
        } else {
            Vec::new()
        };

        let abort = AtomicBool::new(false);
        let (tx, rx) = flume::bounded::<WorkerOutcome<O::Output, O::Error>>(active);

        let scoped = crossbeam::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(active);
            let mut failure: Option<Error> = None;

            for partition in partitions {
                let worker_id = partition.worker();
                let mut builder = scope
                    .builder()
                    .name(format!("{}-{}", self.config.thread_name_prefix, worker_id));
                if let Some(stack_size) = self.config.stack_size {
                    builder = builder.stack_size(stack_size);
                }

                let core = (!core_ids.is_empty()).then(|| core_ids[worker_id % core_ids.len()]);
                let tx = tx.clone();
                let op = &op;
                let abort = &abort;

                let spawned = builder.spawn(move |_| {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }
                    let outcome = worker::run(&partition, items, op, abort);
                    // Fails only once the collector has stopped listening.
                    let _ = tx.send(outcome);
                });

                match spawned {
                    Ok(handle) => handles.push((worker_id, handle)),
                    Err(e) => {
                        warn!(worker = worker_id, error = %e, "failed to spawn worker");
                        abort.store(true, Ordering::Release);
                        failure = Some(Error::Spawn(e.to_string()));
                        break;
                    }
                }
            }
            drop(tx);

            for outcome in rx.iter() {
                match outcome {
                    WorkerOutcome::Completed(partial) => {
                        trace!(
                            worker = partial.worker,
                            processed = partial.processed,
                            kept = partial.entries.len(),
                            "worker finished"
                        );
                        if failure.is_none() {
                            collector.absorb(partial);
                        }
                    }
                    WorkerOutcome::Failed { worker, index, error } => {
                        warn!(operation = O::NAME, worker, index, "operation failed");
                        if failure.is_none() {
                            failure = Some(Error::Operation {
                                index,
                                source: error.into(),
                            });
                        }
                    }
                    WorkerOutcome::Aborted { worker, processed } => {
                        trace!(worker, processed, "worker aborted");
                    }
                }
            }

            for (worker_id, handle) in handles {
                if let Err(payload) = handle.join() {
                    let message = panic_message(payload.as_ref());
                    warn!(operation = O::NAME, worker = worker_id, %message, "worker panicked");
                    if failure.is_none() {
                        failure = Some(Error::WorkerPanicked {
                            worker: worker_id,
                            message,
                        });
                    }
                }
            }

            match failure {
                Some(err) => Err(err),
                None => collector.finish(),
            }
        });

        match scoped {
            Ok(result) => result,
            Err(payload) => Err(Error::WorkerPanicked {
                worker: 0,
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}
